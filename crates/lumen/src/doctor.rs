// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lumen doctor` command implementation.
//!
//! Runs diagnostic checks against the Lumen environment to identify
//! configuration issues, an unreachable Ollama server, missing models
//! and an unreadable profile file.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use lumen_config::LumenConfig;
use lumen_core::{LumenError, ProfileMap};
use lumen_memory::ModelManager;
use lumen_ollama::select_model;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `lumen doctor` command. With `plain`, disables colored output.
pub async fn run_doctor(config: &LumenConfig, plain: bool) -> Result<(), LumenError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let mut results = vec![check_config()];
    results.extend(check_ollama(config).await);
    results.push(check_embedder(config));
    results.push(check_profile(Path::new(&config.memory.profile_path)).await);

    println!();
    println!("  lumen doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    let (symbol, message) = match (&result.status, use_color) {
        (CheckStatus::Pass, true) => ("✓".green().to_string(), result.message.clone()),
        (CheckStatus::Warn, true) => ("!".yellow().to_string(), result.message.yellow().to_string()),
        (CheckStatus::Fail, true) => ("✗".red().to_string(), result.message.red().to_string()),
        (CheckStatus::Pass, false) => ("[OK]  ".to_string(), result.message.clone()),
        (CheckStatus::Warn, false) => ("[WARN]".to_string(), result.message.clone()),
        (CheckStatus::Fail, false) => ("[FAIL]".to_string(), result.message.clone()),
    };
    format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
}

/// Check configuration loads without errors.
fn check_config() -> CheckResult {
    let start = Instant::now();
    match lumen_config::load_and_validate() {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check the Ollama server answers and has a usable model.
async fn check_ollama(config: &LumenConfig) -> Vec<CheckResult> {
    let start = Instant::now();
    let client = match crate::diagnostic_client(config) {
        Ok(client) => client,
        Err(e) => {
            return vec![CheckResult::new(
                "Ollama",
                CheckStatus::Fail,
                format!("HTTP client error: {e}"),
                start,
            )];
        }
    };

    let models = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            let message = if e.is_unavailable() {
                format!("not reachable at {}", client.base_url())
            } else {
                e.to_string()
            };
            return vec![CheckResult::new("Ollama", CheckStatus::Fail, message, start)];
        }
    };

    let reachable = CheckResult::new(
        "Ollama",
        CheckStatus::Pass,
        format!("reachable at {}", client.base_url()),
        start,
    );
    vec![reachable, model_result(&config.ollama.model, &models, start)]
}

fn model_result(configured: &str, installed: &[String], start: Instant) -> CheckResult {
    if installed.is_empty() {
        return CheckResult::new(
            "Models",
            CheckStatus::Warn,
            "no models installed (try `ollama pull openhermes`)",
            start,
        );
    }
    let chosen = select_model(configured, installed);
    if installed.iter().any(|name| *name == chosen) {
        CheckResult::new(
            "Models",
            CheckStatus::Pass,
            format!("{} installed, using {chosen}", installed.len()),
            start,
        )
    } else {
        CheckResult::new(
            "Models",
            CheckStatus::Warn,
            format!("{chosen} is not installed"),
            start,
        )
    }
}

/// Check the embedding backend is ready to load.
fn check_embedder(config: &LumenConfig) -> CheckResult {
    let start = Instant::now();
    match config.memory.embedder.as_str() {
        "onnx" => {
            let manager = ModelManager::new(&config.memory.model_dir);
            if manager.is_model_available() {
                CheckResult::new(
                    "Embeddings",
                    CheckStatus::Pass,
                    format!("model at {}", manager.model_dir().display()),
                    start,
                )
            } else {
                CheckResult::new(
                    "Embeddings",
                    CheckStatus::Warn,
                    format!(
                        "model not downloaded yet (will be fetched into {})",
                        manager.model_dir().display()
                    ),
                    start,
                )
            }
        }
        "hashing" => CheckResult::new(
            "Embeddings",
            CheckStatus::Warn,
            "hashing embedder: memory search matches words, not meaning",
            start,
        ),
        other => CheckResult::new(
            "Embeddings",
            CheckStatus::Pass,
            format!("{other} ({})", config.ollama.embedding_model),
            start,
        ),
    }
}

/// Check the profile file can be read and parsed.
async fn check_profile(path: &Path) -> CheckResult {
    let start = Instant::now();
    let display = path.display();

    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return CheckResult::new(
                "Profile",
                CheckStatus::Warn,
                format!("not found: {display} (will be created on first fact)"),
                start,
            );
        }
        Err(e) => {
            return CheckResult::new(
                "Profile",
                CheckStatus::Fail,
                format!("read failed: {e}"),
                start,
            );
        }
    };

    match serde_json::from_str::<ProfileMap>(&contents) {
        Ok(profile) => CheckResult::new(
            "Profile",
            CheckStatus::Pass,
            format!("{} entries", profile.len()),
            start,
        ),
        Err(e) => CheckResult::new(
            "Profile",
            CheckStatus::Fail,
            format!("not valid JSON: {e}"),
            start,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_profile_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_profile(&dir.path().join("profile.json")).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn readable_profile_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, r#"{"name": "Ann", "location": "Paris"}"#).unwrap();
        let result = check_profile(&path).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.message, "2 entries");
    }

    #[tokio::test]
    async fn corrupt_profile_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "{not json").unwrap();
        let result = check_profile(&path).await;
        assert_eq!(result.status, CheckStatus::Fail);
    }

    #[tokio::test]
    async fn unreachable_ollama_fails() {
        let mut config = LumenConfig::default();
        config.ollama.base_url = "http://127.0.0.1:9".into();
        let results = check_ollama(&config).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Fail);
    }

    #[test]
    fn installed_model_passes() {
        let installed = vec!["llama3:8b".to_string()];
        let result = model_result("", &installed, Instant::now());
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.message.contains("llama3:8b"));
    }

    #[test]
    fn missing_configured_model_warns() {
        let installed = vec!["llama3:8b".to_string()];
        let result = model_result("mistral:7b", &installed, Instant::now());
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[test]
    fn missing_onnx_model_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LumenConfig::default();
        config.memory.model_dir = dir.path().display().to_string();
        assert_eq!(check_embedder(&config).status, CheckStatus::Warn);

        let manager = ModelManager::new(dir.path());
        std::fs::create_dir_all(manager.model_dir()).unwrap();
        std::fs::write(manager.model_path(), b"onnx").unwrap();
        std::fs::write(manager.tokenizer_path(), b"{}").unwrap();
        assert_eq!(check_embedder(&config).status, CheckStatus::Pass);
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let result = CheckResult::new("Profile", CheckStatus::Warn, "missing", Instant::now());
        let line = format_line(&result, false);
        assert!(line.contains("[WARN]"));
        assert!(!line.contains('\u{1b}'));
    }
}
