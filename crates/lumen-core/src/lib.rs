// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lumen assistant.
//!
//! This crate provides the error type, the adapter traits, and the shared
//! data types (chat turns, profile values, completion requests) used by
//! every other crate in the workspace.

pub mod error;
pub mod traits;
pub mod types;
pub mod value;

// Re-export key items at crate root for ergonomic imports.
pub use error::LumenError;
pub use types::{AdapterType, ChatTurn, CompletionRequest, HealthStatus, Role};
pub use value::{ProfileMap, ProfileValue};

// Re-export all adapter traits at crate root.
pub use traits::{ChunkStream, EmbeddingAdapter, LanguageModel, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lumen_error_has_all_variants() {
        let _config = LumenError::Config("test".into());
        let _storage = LumenError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = LumenError::Provider {
            message: "test".into(),
            source: None,
        };
        let _unreachable = LumenError::Unreachable {
            message: "test".into(),
            source: None,
        };
        let _timeout = LumenError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _parse = LumenError::Parse {
            message: "test".into(),
        };
        let _internal = LumenError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::LanguageModel, AdapterType::Embedding] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_language_model<T: LanguageModel>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
    }
}
