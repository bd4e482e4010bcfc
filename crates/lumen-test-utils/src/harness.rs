// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete agent with a mock model, the offline
//! hashing embedder and a temporary data directory. Provides
//! `send_message()` to drive the full turn pipeline in tests.

use std::path::PathBuf;
use std::sync::Arc;

use lumen_agent::AgentCore;
use lumen_config::LumenConfig;
use lumen_core::{LumenError, ProfileMap};
use lumen_memory::HashingEmbedder;

use crate::mock_model::{MockModel, MockReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    session_behavior: bool,
    turn_log: bool,
    memory_enabled: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            session_behavior: false,
            turn_log: false,
            memory_enabled: true,
        }
    }

    /// Set mock model replies, consumed in call order.
    pub fn with_mock_replies<R: Into<MockReply>>(mut self, replies: impl IntoIterator<Item = R>) -> Self {
        self.replies = replies.into_iter().map(Into::into).collect();
        self
    }

    /// Re-run behavior inference over the session after each turn.
    pub fn with_session_behavior(mut self) -> Self {
        self.session_behavior = true;
        self
    }

    /// Write the daily turn log.
    pub fn with_turn_log(mut self) -> Self {
        self.turn_log = true;
        self
    }

    /// Run without the memory pipeline.
    pub fn without_memory(mut self) -> Self {
        self.memory_enabled = false;
        self
    }

    /// Build the test harness, creating the temp data directory and agent.
    pub async fn build(self) -> Result<TestHarness, LumenError> {
        let temp_dir = tempfile::TempDir::new().map_err(LumenError::storage)?;

        let mut config = LumenConfig::default();
        config.agent.name = "test-assistant".to_string();
        config.memory.enabled = self.memory_enabled;
        config.memory.session_behavior = self.session_behavior;
        config.memory.turn_log = self.turn_log;
        config.memory.embedder = "hashing".to_string();
        config.memory.profile_path = temp_dir
            .path()
            .join("profile.json")
            .to_string_lossy()
            .to_string();
        config.memory.log_dir = temp_dir.path().join("logs").to_string_lossy().to_string();

        let mock_model = MockModel::with_replies(self.replies);
        let agent = AgentCore::from_config(
            &config,
            Arc::new(mock_model.clone()),
            Arc::new(HashingEmbedder::new(config.memory.embedding_dim)),
        )
        .await;

        Ok(TestHarness {
            mock_model,
            agent,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock model and temp storage.
pub struct TestHarness {
    /// The mock language model shared with the agent.
    pub mock_model: MockModel,
    /// The agent under test.
    pub agent: AgentCore,
    /// Configuration the agent was built from.
    pub config: LumenConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send a message through the full turn pipeline and return the reply.
    pub async fn send_message(&self, text: &str) -> String {
        self.agent.respond(text).await
    }

    /// Send a message with streaming and return the chunks as delivered.
    pub async fn stream_message(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        self.agent
            .respond_stream(text, |chunk| chunks.push(chunk.to_string()))
            .await;
        chunks
    }

    /// Profile as currently held in memory.
    pub async fn profile(&self) -> ProfileMap {
        self.agent.profile().await
    }

    /// Path of the profile file.
    pub fn profile_path(&self) -> PathBuf {
        PathBuf::from(&self.config.memory.profile_path)
    }

    /// Directory of the daily turn log.
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.memory.log_dir)
    }
}
