// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter backed by Ollama's `/api/embed` endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lumen_core::types::{EmbeddingInput, EmbeddingOutput};
use lumen_core::{AdapterType, EmbeddingAdapter, HealthStatus, LumenError, PluginAdapter};

use crate::client::OllamaClient;

/// Embeds text with a model served by Ollama (e.g. `nomic-embed-text`).
///
/// The vector length is a property of the model, so [`dimensions`] reports
/// the length seen on the most recent successful call and `0` before that.
///
/// [`dimensions`]: EmbeddingAdapter::dimensions
#[derive(Debug)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    dimensions: AtomicUsize,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            dimensions: AtomicUsize::new(0),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PluginAdapter for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama-embed"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, LumenError> {
        match self.client.list_models().await {
            Ok(models) if models.iter().any(|m| m.starts_with(&self.model)) => {
                Ok(HealthStatus::Healthy)
            }
            Ok(_) => Ok(HealthStatus::Degraded(format!(
                "embedding model `{}` is not installed",
                self.model
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, LumenError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: self.dimensions(),
            });
        }

        let embeddings = self.client.embed(&self.model, &input.texts).await?;
        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        self.dimensions.store(dimensions, Ordering::Relaxed);

        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn dimensions_track_last_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.5, 0.5, 0.0]]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let embedder = OllamaEmbedder::new(client, "nomic-embed-text");
        assert_eq!(embedder.dimensions(), 0);

        let out = embedder
            .embed(EmbeddingInput {
                texts: vec!["hello".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.dimensions, 3);
        assert_eq!(embedder.dimensions(), 3);
    }

    #[tokio::test]
    async fn empty_input_skips_request() {
        let client =
            OllamaClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let embedder = OllamaEmbedder::new(client, "nomic-embed-text");
        let out = embedder.embed(EmbeddingInput { texts: vec![] }).await.unwrap();
        assert!(out.embeddings.is_empty());
    }

    #[tokio::test]
    async fn health_reports_missing_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama3:latest"}]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let embedder = OllamaEmbedder::new(client, "nomic-embed-text");
        let status = embedder.health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(_)));
    }
}
