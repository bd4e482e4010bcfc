// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lumen assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Lumen configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LumenConfig {
    /// Assistant identity, logging and session settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Local Ollama server settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Memory pipeline settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Assistant identity and session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Number of chat turns kept in the session ring buffer.
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,

    /// Stream replies chunk by chunk in the shell.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            session_capacity: default_session_capacity(),
            stream: default_stream(),
        }
    }
}

fn default_agent_name() -> String {
    "lumen".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_session_capacity() -> usize {
    10
}

fn default_stream() -> bool {
    true
}

/// Ollama server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama HTTP API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model. Empty means pick one from the locally installed models.
    #[serde(default)]
    pub model: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Model used when `memory.embedder = "ollama"`.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: String::new(),
            timeout_secs: default_timeout_secs(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

/// Memory pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory pipeline. When false, turns are not processed.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// JSON file holding the user profile.
    #[serde(default = "default_profile_path")]
    pub profile_path: String,

    /// Directory for the daily turn log.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Append every turn to `{log_dir}/{date}.jsonl`.
    #[serde(default)]
    pub turn_log: bool,

    /// Exchanges longer than this many characters are summarized before indexing.
    #[serde(default = "default_summarize_threshold")]
    pub summarize_threshold: usize,

    /// Number of recent exchanges shown to the behavior analyzer.
    #[serde(default = "default_behavior_window")]
    pub behavior_window: usize,

    /// Sampling temperature for behavior inference.
    #[serde(default)]
    pub behavior_temperature: f32,

    /// After each non-streamed turn, re-run behavior inference over the
    /// whole session and store the result. Streamed turns only analyze the
    /// latest user message.
    #[serde(default = "default_session_behavior")]
    pub session_behavior: bool,

    /// Number of memories returned by a memory search.
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,

    /// Embedding backend: "onnx" (local all-MiniLM-L6-v2), "ollama", or
    /// "hashing" (lexical only, no model download).
    #[serde(default = "default_embedder")]
    pub embedder: String,

    /// Directory the ONNX embedding model is downloaded into.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Vector length for the hashing embedder.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            profile_path: default_profile_path(),
            log_dir: default_log_dir(),
            turn_log: false,
            summarize_threshold: default_summarize_threshold(),
            behavior_window: default_behavior_window(),
            behavior_temperature: 0.0,
            session_behavior: default_session_behavior(),
            retrieval_top_k: default_retrieval_top_k(),
            embedder: default_embedder(),
            model_dir: default_model_dir(),
            embedding_dim: default_embedding_dim(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_profile_path() -> String {
    "data/profile.json".to_string()
}

fn default_log_dir() -> String {
    "data/logs/".to_string()
}

fn default_summarize_threshold() -> usize {
    500
}

fn default_behavior_window() -> usize {
    10
}

fn default_retrieval_top_k() -> usize {
    3
}

fn default_session_behavior() -> bool {
    true
}

fn default_embedder() -> String {
    "onnx".to_string()
}

fn default_model_dir() -> String {
    "data/models/".to_string()
}

fn default_embedding_dim() -> usize {
    384
}
