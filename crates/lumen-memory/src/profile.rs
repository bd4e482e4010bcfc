// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable key/value profile persisted as one pretty-printed JSON document.
//!
//! The in-memory map is authoritative. Every `set` rewrites the whole file
//! through a sibling temporary file and a rename, so readers see either the
//! previous document or the new one.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use lumen_core::{LumenError, ProfileMap, ProfileValue};
use tracing::{debug, error, info, warn};

/// Key holding the latest behavior snapshot.
pub const BEHAVIOR_KEY: &str = "behavior";

/// Profile of facts and inferred traits about the user.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    data: ProfileMap,
}

impl ProfileStore {
    /// Loads the profile at `path`.
    ///
    /// A missing file gives an empty profile. An unreadable or corrupt file
    /// is logged and also gives an empty profile; the file itself is left
    /// alone until the next successful `set` replaces it.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<ProfileMap>(&content) {
                Ok(data) => {
                    info!(path = %path.display(), keys = data.len(), "loaded profile");
                    data
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt profile file, starting empty");
                    ProfileMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no profile file yet");
                ProfileMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read profile file, starting empty");
                ProfileMap::new()
            }
        };
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.data.get(key)
    }

    /// Returns a copy of the whole profile.
    pub fn get_all(&self) -> ProfileMap {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sets `key` and rewrites the file.
    ///
    /// The in-memory value is updated even when the write fails.
    pub async fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ProfileValue>,
    ) -> Result<(), LumenError> {
        let key = key.into();
        self.data.insert(key.clone(), value.into());
        if let Err(e) = self.save().await {
            error!(path = %self.path.display(), key = %key, error = %e, "failed to persist profile");
            return Err(e);
        }
        debug!(key = %key, "profile updated");
        Ok(())
    }

    async fn save(&self) -> Result<(), LumenError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(LumenError::storage)?;
        }

        let json = serde_json::to_string_pretty(&self.data).map_err(LumenError::storage)?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(LumenError::storage)?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(LumenError::storage(e));
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::open(dir.path().join("profile.json")).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/profile.json");

        let mut store = ProfileStore::open(&path).await;
        store.set("name", "John Smith").await.unwrap();
        store.set("age", 42_i64).await.unwrap();
        assert_eq!(store.get("name").and_then(|v| v.as_str()), Some("John Smith"));

        let reloaded = ProfileStore::open(&path).await;
        assert_eq!(reloaded.get_all(), store.get_all());
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ProfileStore::open(dir.path().join("p.json")).await;
        store.set("location", "Paris").await.unwrap();
        store.set("location", "Oslo").await.unwrap();
        assert_eq!(store.get("location").and_then(|v| v.as_str()), Some("Oslo"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn file_is_pretty_printed_with_two_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut store = ProfileStore::open(&path).await;
        store.set("name", "Ann").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"name\": \"Ann\"\n}");
    }

    #[tokio::test]
    async fn corrupt_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = ProfileStore::open(&path).await;
        assert!(store.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn null_values_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        std::fs::write(&path, r#"{"nickname": null, "tags": ["a", 1]}"#).unwrap();

        let mut store = ProfileStore::open(&path).await;
        assert!(store.get("nickname").unwrap().is_null());
        store.set("name", "Ann").await.unwrap();

        let reloaded = ProfileStore::open(&path).await;
        assert!(reloaded.get("nickname").unwrap().is_null());
        assert_eq!(reloaded.len(), 3);
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_value() {
        let dir = tempfile::tempdir().unwrap();
        // The parent "directory" is a regular file, so the write must fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let mut store = ProfileStore::open(blocker.join("p.json")).await;
        let result = store.set("name", "Ann").await;
        assert!(matches!(result, Err(LumenError::Storage { .. })));
        assert_eq!(store.get("name").and_then(|v| v.as_str()), Some("Ann"));
    }
}
