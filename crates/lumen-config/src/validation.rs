// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints that serde attributes cannot express:
//! URL schemes, non-empty paths, and numeric ranges.

use crate::diagnostic::ConfigError;
use crate::model::LumenConfig;

/// Log levels accepted by `agent.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Embedding backends accepted by `memory.embedder`.
pub const EMBEDDERS: &[&str] = &["onnx", "ollama", "hashing"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &LumenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.ollama.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "ollama.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("ollama.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.ollama.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "ollama.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.memory.profile_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "memory.profile_path must not be empty".to_string(),
        });
    }

    if config.memory.log_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "memory.log_dir must not be empty".to_string(),
        });
    }

    if config.agent.session_capacity < 2 {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.session_capacity must hold at least one exchange (2 turns), got {}",
                config.agent.session_capacity
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.memory.behavior_window == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.behavior_window must be at least 1".to_string(),
        });
    }

    let temperature = config.memory.behavior_temperature;
    if !(0.0..=2.0).contains(&temperature) {
        errors.push(ConfigError::Validation {
            message: format!("memory.behavior_temperature must be within 0.0..=2.0, got {temperature}"),
        });
    }

    if !EMBEDDERS.contains(&config.memory.embedder.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.embedder `{}` is not one of {}",
                config.memory.embedder,
                EMBEDDERS.join(", ")
            ),
        });
    }

    if config.memory.embedder == "onnx" && config.memory.model_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "memory.model_dir must not be empty when memory.embedder = \"onnx\"".to_string(),
        });
    }

    if config.memory.embedding_dim < 8 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.embedding_dim must be at least 8, got {}",
                config.memory.embedding_dim
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
