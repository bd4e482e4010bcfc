// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lumen assistant.

use thiserror::Error;

/// The primary error type used across all Lumen adapters and the memory pipeline.
#[derive(Debug, Error)]
pub enum LumenError {
    /// Configuration errors (invalid values, unusable paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage errors (profile file, turn log).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The language-model server answered, but not successfully
    /// (non-2xx status or an unreadable body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The language-model server could not be reached at all.
    #[error("provider unreachable: {message}")]
    Unreachable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Model output could not be decoded into the expected structure.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LumenError {
    /// Wraps an I/O error as a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        LumenError::Storage {
            source: Box::new(err),
        }
    }

    /// True when the failure means the model service is down rather than
    /// answering badly.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            LumenError::Unreachable { .. } | LumenError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_classification() {
        assert!(
            LumenError::Unreachable {
                message: "connection refused".into(),
                source: None
            }
            .is_unavailable()
        );
        assert!(
            LumenError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_unavailable()
        );
        assert!(
            !LumenError::Provider {
                message: "500".into(),
                source: None
            }
            .is_unavailable()
        );
    }

    #[test]
    fn storage_helper_keeps_message() {
        let err = LumenError::storage(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "storage error: disk full");
    }
}
