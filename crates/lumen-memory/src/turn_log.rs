// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only daily log of conversation turns, one JSON object per line.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lumen_core::{LumenError, Role};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

/// One line of a daily turn log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnLogEntry {
    pub time: String,
    pub role: Role,
    pub text: String,
}

/// Writes turns to `{dir}/{YYYY-MM-DD}.jsonl`, dated in UTC.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    dir: PathBuf,
}

impl SessionLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log file for the day containing `at`.
    pub fn file_for(&self, at: DateTime<Utc>) -> PathBuf {
        self.dir.join(format!("{}.jsonl", at.format("%Y-%m-%d")))
    }

    /// Appends one turn to today's log.
    pub async fn log(&self, role: Role, text: &str) -> Result<(), LumenError> {
        self.log_at(Utc::now(), role, text).await
    }

    async fn log_at(&self, at: DateTime<Utc>, role: Role, text: &str) -> Result<(), LumenError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(LumenError::storage)?;

        let entry = TurnLogEntry {
            time: at.to_rfc3339(),
            role,
            text: text.to_string(),
        };
        let mut line = serde_json::to_string(&entry).map_err(LumenError::storage)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(at))
            .await
            .map_err(LumenError::storage)?;
        file.write_all(line.as_bytes())
            .await
            .map_err(LumenError::storage)?;
        file.flush().await.map_err(LumenError::storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn appends_one_line_per_turn() {
        let dir = tempfile::tempdir().unwrap();
        let logger = SessionLogger::new(dir.path().join("logs"));
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();

        logger.log_at(at, Role::User, "hello").await.unwrap();
        logger.log_at(at, Role::Assistant, "hi\nthere").await.unwrap();

        let path = dir.path().join("logs/2026-03-14.jsonl");
        let content = std::fs::read_to_string(path).unwrap();
        let entries: Vec<TurnLogEntry> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[1].text, "hi\nthere");
        assert!(entries[0].time.starts_with("2026-03-14T09:30:00"));
    }

    #[tokio::test]
    async fn line_uses_lowercase_role() {
        let dir = tempfile::tempdir().unwrap();
        let logger = SessionLogger::new(dir.path());
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        logger.log_at(at, Role::Assistant, "ok").await.unwrap();

        let content = std::fs::read_to_string(logger.file_for(at)).unwrap();
        assert!(content.contains("\"role\":\"assistant\""));
        assert!(content.ends_with('\n'));
    }
}
