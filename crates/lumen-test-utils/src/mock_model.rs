// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language models for deterministic testing.
//!
//! `MockModel` implements `LanguageModel` with pre-configured replies and
//! failures, enabling fast, CI-runnable tests without a running Ollama.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use lumen_core::{
    AdapterType, ChunkStream, CompletionRequest, HealthStatus, LanguageModel, LumenError,
    PluginAdapter,
};

/// Reply text used when the queue is empty.
pub const DEFAULT_REPLY: &str = "mock response";

/// A failure a mock model can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// The server answered with a non-success status.
    Status,
    /// The server could not be reached.
    Unreachable,
    /// The request timed out.
    Timeout,
}

impl MockFailure {
    fn to_error(self) -> LumenError {
        match self {
            MockFailure::Status => LumenError::Provider {
                message: "mock server returned 500".into(),
                source: None,
            },
            MockFailure::Unreachable => LumenError::Unreachable {
                message: "mock server is down".into(),
                source: None,
            },
            MockFailure::Timeout => LumenError::Timeout {
                duration: std::time::Duration::from_secs(1),
            },
        }
    }
}

/// One scripted reaction to a request.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail(MockFailure),
    /// Streams `partial` and then fails with `message`.
    /// A non-streaming call fails immediately.
    BrokenStream { partial: String, message: String },
}

impl From<&str> for MockReply {
    fn from(text: &str) -> Self {
        MockReply::Text(text.to_string())
    }
}

impl From<String> for MockReply {
    fn from(text: String) -> Self {
        MockReply::Text(text)
    }
}

/// A mock language model that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// [`DEFAULT_REPLY`] is returned. Every request is recorded.
#[derive(Clone)]
pub struct MockModel {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockModel {
    /// Create a new mock model with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock model pre-loaded with the given replies.
    pub fn with_replies<R: Into<MockReply>>(replies: impl IntoIterator<Item = R>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(Into::into).collect())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn push_reply(&self, reply: impl Into<MockReply>) {
        self.replies.lock().await.push_back(reply.into());
    }

    /// All requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Prompts received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    /// Number of requests received so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn next_reply(&self, request: CompletionRequest) -> MockReply {
        self.requests.lock().await.push(request);
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text(DEFAULT_REPLY.to_string()))
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockModel {
    fn name(&self) -> &str {
        "mock-model"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::LanguageModel
    }

    async fn health_check(&self) -> Result<HealthStatus, LumenError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LumenError> {
        match self.next_reply(request).await {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(failure) => Err(failure.to_error()),
            MockReply::BrokenStream { message, .. } => Err(LumenError::Provider {
                message,
                source: None,
            }),
        }
    }

    async fn stream(&self, request: CompletionRequest) -> Result<ChunkStream, LumenError> {
        let chunks: Vec<Result<String, LumenError>> = match self.next_reply(request).await {
            MockReply::Text(text) => split_words(&text).into_iter().map(Ok).collect(),
            MockReply::Fail(failure) => return Err(failure.to_error()),
            MockReply::BrokenStream { partial, message } => split_words(&partial)
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(LumenError::Provider {
                    message,
                    source: None,
                })))
                .collect(),
        };
        Ok(Box::pin(stream::iter(chunks)))
    }
}

/// Splits text into chunks that concatenate back to the original,
/// each word carrying its trailing whitespace.
fn split_words(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if !ch.is_whitespace() && current.ends_with(char::is_whitespace) {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// A language model that fails every request the same way.
#[derive(Debug, Clone, Copy)]
pub struct FailingModel {
    failure: MockFailure,
}

impl FailingModel {
    pub fn new(failure: MockFailure) -> Self {
        Self { failure }
    }

    /// A model whose server is down.
    pub fn unreachable() -> Self {
        Self::new(MockFailure::Unreachable)
    }
}

#[async_trait]
impl PluginAdapter for FailingModel {
    fn name(&self) -> &str {
        "failing-model"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::LanguageModel
    }

    async fn health_check(&self) -> Result<HealthStatus, LumenError> {
        Ok(HealthStatus::Unhealthy(self.failure.to_error().to_string()))
    }
}

#[async_trait]
impl LanguageModel for FailingModel {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LumenError> {
        Err(self.failure.to_error())
    }

    async fn stream(&self, _request: CompletionRequest) -> Result<ChunkStream, LumenError> {
        Err(self.failure.to_error())
    }
}
