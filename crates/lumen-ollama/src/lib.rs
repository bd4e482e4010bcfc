// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama adapters for the Lumen assistant.
//!
//! This crate implements [`LanguageModel`] over `/api/generate` (plain and
//! newline-delimited JSON streaming) and [`EmbeddingAdapter`] over
//! `/api/embed`. When no model is configured the active model is chosen
//! from the models installed on the server.

pub mod client;
pub mod embedder;
pub mod models;
pub mod stream;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use lumen_config::LumenConfig;
use lumen_core::{
    AdapterType, ChunkStream, CompletionRequest, HealthStatus, LanguageModel, LumenError,
    PluginAdapter,
};
use tracing::debug;

pub use client::OllamaClient;
pub use embedder::OllamaEmbedder;
pub use models::{resolve_model, select_model, DEFAULT_MODEL, PREFERRED_MODELS};

use crate::types::{GenerateOptions, GenerateRequest};

/// Ollama language model implementing [`LanguageModel`].
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: OllamaClient,
    model: String,
}

impl OllamaProvider {
    /// Creates a provider from configuration.
    ///
    /// When `ollama.model` is empty the server is asked for its installed
    /// models; an unreachable server is not an error here.
    pub async fn new(config: &LumenConfig) -> Result<Self, LumenError> {
        let client = OllamaClient::new(
            config.ollama.base_url.clone(),
            Duration::from_secs(config.ollama.timeout_secs),
        )?;
        let model = resolve_model(&client, &config.ollama.model).await;
        Ok(Self::with_client(client, model))
    }

    /// Creates a provider for an already-built client and model name.
    pub fn with_client(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Returns the active model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the underlying HTTP client.
    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    fn to_generate_request(&self, request: CompletionRequest, stream: bool) -> GenerateRequest {
        GenerateRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            prompt: request.prompt,
            stream,
            options: request.temperature.map(|t| GenerateOptions {
                temperature: Some(t),
            }),
        }
    }
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::LanguageModel
    }

    async fn health_check(&self) -> Result<HealthStatus, LumenError> {
        match self.client.list_models().await {
            Ok(models) if models.iter().any(|m| m == &self.model) => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Degraded(format!(
                "model `{}` is not installed",
                self.model
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LumenError> {
        let req = self.to_generate_request(request, false);
        debug!(model = %req.model, prompt_len = req.prompt.len(), "sending completion");
        self.client.generate(&req).await
    }

    async fn stream(&self, request: CompletionRequest) -> Result<ChunkStream, LumenError> {
        let req = self.to_generate_request(request, true);
        debug!(model = %req.model, prompt_len = req.prompt.len(), "starting stream");
        self.client.generate_stream(&req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str) -> OllamaProvider {
        let client = OllamaClient::new(base_url, Duration::from_secs(5)).unwrap();
        OllamaProvider::with_client(client, "llama3")
    }

    #[test]
    fn plugin_adapter_metadata() {
        let provider = provider("http://localhost:11434");
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.adapter_type(), AdapterType::LanguageModel);
        assert_eq!(provider.model(), "llama3");
    }

    #[test]
    fn request_uses_active_model_unless_overridden() {
        let provider = provider("http://localhost:11434");
        let req = provider.to_generate_request(CompletionRequest::new("hi"), false);
        assert_eq!(req.model, "llama3");
        assert!(req.options.is_none());

        let req = provider.to_generate_request(
            CompletionRequest::new("hi").with_model("mistral").with_temperature(0.0),
            true,
        );
        assert_eq!(req.model, "mistral");
        assert!(req.stream);
        assert_eq!(req.options.and_then(|o| o.temperature), Some(0.0));
    }

    #[tokio::test]
    async fn new_resolves_model_from_tags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "phi3:mini"}, {"name": "mistral:7b"}]
            })))
            .mount(&server)
            .await;

        let mut config = LumenConfig::default();
        config.ollama.base_url = server.uri();
        config.ollama.model = String::new();
        let provider = OllamaProvider::new(&config).await.unwrap();
        assert_eq!(provider.model(), "mistral:7b");
    }

    #[tokio::test]
    async fn complete_sends_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "options": {"temperature": 0.0}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "{}",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = provider(&server.uri())
            .complete(CompletionRequest::new("analyze").with_temperature(0.0))
            .await
            .unwrap();
        assert_eq!(reply, "{}");
    }

    #[tokio::test]
    async fn health_check_reports_unreachable_server() {
        let status = provider("http://127.0.0.1:9").health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(_)));
    }
}
