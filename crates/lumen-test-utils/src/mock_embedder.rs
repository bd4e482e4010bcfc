// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapters that fail on demand.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lumen_core::types::{EmbeddingInput, EmbeddingOutput};
use lumen_core::{AdapterType, EmbeddingAdapter, HealthStatus, LumenError, PluginAdapter};
use lumen_memory::HashingEmbedder;

/// An embedder that succeeds for a fixed number of calls and then fails
/// every call after that.
#[derive(Debug)]
pub struct FailingEmbedder {
    inner: HashingEmbedder,
    successes_left: AtomicUsize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    /// Fails every call.
    pub fn new() -> Self {
        Self::after(0)
    }

    /// Embeds normally for the first `successes` calls.
    pub fn after(successes: usize) -> Self {
        Self {
            inner: HashingEmbedder::new(64),
            successes_left: AtomicUsize::new(successes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for FailingEmbedder {
    fn name(&self) -> &str {
        "failing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, LumenError> {
        Ok(HealthStatus::Degraded("scripted to fail".into()))
    }
}

#[async_trait]
impl EmbeddingAdapter for FailingEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, LumenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let allowed = self
            .successes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if allowed {
            self.inner.embed(input).await
        } else {
            Err(LumenError::Internal("embedding backend failed".into()))
        }
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> EmbeddingInput {
        EmbeddingInput {
            texts: vec!["hello".into()],
        }
    }

    #[tokio::test]
    async fn fails_every_call_by_default() {
        let embedder = FailingEmbedder::new();
        assert!(embedder.embed(input()).await.is_err());
        assert!(embedder.embed(input()).await.is_err());
        assert_eq!(embedder.call_count(), 2);
    }

    #[tokio::test]
    async fn succeeds_then_fails() {
        let embedder = FailingEmbedder::after(1);
        assert!(embedder.embed(input()).await.is_ok());
        assert!(embedder.embed(input()).await.is_err());
    }
}
