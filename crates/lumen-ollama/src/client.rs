// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a local Ollama server.
//!
//! Provides [`OllamaClient`] which handles request construction, maps
//! transport failures onto [`LumenError`] and parses streamed replies.

use std::time::Duration;

use lumen_core::{ChunkStream, LumenError};
use tracing::debug;

use crate::stream::parse_ndjson_stream;
use crate::types::{
    ApiErrorResponse, EmbedRequest, EmbedResponse, GenerateRequest, GenerateResponse,
    TagsResponse,
};

/// HTTP client for Ollama API communication.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Creates a client for the server at `base_url`
    /// (for example `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LumenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LumenError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Returns the server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a non-streaming generate request and returns the reply text with
    /// surrounding whitespace removed.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, LumenError> {
        let mut req = request.clone();
        req.stream = false;

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(status = %status, model = %req.model, "generate response received");
        let response = check_status(response).await?;

        let body: GenerateResponse =
            response.json().await.map_err(|e| self.body_error("generate", e))?;
        if let Some(message) = body.error {
            return Err(LumenError::Provider {
                message: format!("Ollama error: {message}"),
                source: None,
            });
        }
        Ok(body.response.trim().to_string())
    }

    /// Sends a streaming generate request and returns the text chunks.
    pub async fn generate_stream(&self, request: &GenerateRequest) -> Result<ChunkStream, LumenError> {
        let mut req = request.clone();
        req.stream = true;

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(status = %status, model = %req.model, "streaming response received");
        let response = check_status(response).await?;

        Ok(parse_ndjson_stream(response.bytes_stream()))
    }

    /// Lists the names of models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<String>, LumenError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = check_status(response).await?;

        let tags: TagsResponse = response.json().await.map_err(|e| self.body_error("tags", e))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Embeds a batch of texts with the given model.
    pub async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, LumenError> {
        let request = EmbedRequest {
            model: model.to_string(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(self.url("/api/embed"))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = check_status(response).await?;

        let body: EmbedResponse = response.json().await.map_err(|e| self.body_error("embed", e))?;
        if body.embeddings.len() != texts.len() {
            return Err(LumenError::Provider {
                message: format!(
                    "expected {} embeddings, server returned {}",
                    texts.len(),
                    body.embeddings.len()
                ),
                source: None,
            });
        }
        Ok(body.embeddings)
    }

    fn transport_error(&self, e: reqwest::Error) -> LumenError {
        if e.is_timeout() {
            LumenError::Timeout {
                duration: self.timeout,
            }
        } else {
            LumenError::Unreachable {
                message: format!("cannot reach Ollama at {}: {e}", self.base_url),
                source: Some(Box::new(e)),
            }
        }
    }

    fn body_error(&self, endpoint: &str, e: reqwest::Error) -> LumenError {
        if e.is_timeout() {
            return LumenError::Timeout {
                duration: self.timeout,
            };
        }
        LumenError::Provider {
            message: format!("failed to parse {endpoint} response: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

/// Passes 2xx responses through and turns everything else into a provider error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LumenError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_err) => format!("Ollama returned {status}: {}", api_err.error),
        Err(_) => format!("Ollama returned {status}: {body}"),
    };
    Err(LumenError::Provider {
        message,
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::types::GenerateOptions;

    fn test_client(base_url: &str) -> OllamaClient {
        OllamaClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "llama3".into(),
            prompt: prompt.into(),
            stream: false,
            options: Some(GenerateOptions {
                temperature: Some(0.0),
            }),
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = test_client("http://localhost:11434/");
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[tokio::test]
    async fn generate_returns_response_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "prompt": "Hello",
                "stream": false,
                "options": {"temperature": 0.0}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3",
                "response": "Hi there!",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.generate(&request("Hello")).await.unwrap();
        assert_eq!(reply, "Hi there!");
    }

    #[tokio::test]
    async fn generate_trims_surrounding_whitespace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3",
                "response": "  hi there \n",
                "done": true
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.generate(&request("Hello")).await.unwrap();
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn non_2xx_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "model 'llama3' not found"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.generate(&request("Hello")).await.unwrap_err();
        assert!(matches!(err, LumenError::Provider { .. }));
        assert!(!err.is_unavailable());
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        // Port 9 (discard) is almost never bound on test machines.
        let client = test_client("http://127.0.0.1:9");
        let err = client.generate(&request("Hello")).await.unwrap_err();
        assert!(err.is_unavailable(), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_server_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(serde_json::json!({"response": "late", "done": true})),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), Duration::from_millis(200)).unwrap();
        let err = client.generate(&request("Hello")).await.unwrap_err();
        assert!(matches!(err, LumenError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn stream_concatenates_chunks() {
        let server = MockServer::start().await;
        let body = "{\"response\":\"Hel\",\"done\":false}\n\
                    {\"response\":\"lo!\",\"done\":false}\n\
                    {\"response\":\"\",\"done\":true}\n";
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.as_bytes().to_vec(), "application/x-ndjson"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let stream = client.generate_stream(&request("Hello")).await.unwrap();
        let chunks: Vec<String> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.concat(), "Hello!");
    }

    #[tokio::test]
    async fn list_models_reads_tag_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "mistral:7b", "size": 1},
                    {"name": "llama3:latest", "size": 2}
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["mistral:7b", "llama3:latest"]);
    }

    #[tokio::test]
    async fn embed_returns_one_vector_per_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(serde_json::json!({
                "model": "nomic-embed-text",
                "input": ["a", "b"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2], [0.3, 0.4]]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let vectors = client
            .embed("nomic-embed-text", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![0.3, 0.4]);
    }

    #[tokio::test]
    async fn embed_count_mismatch_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2]]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .embed("nomic-embed-text", &["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected 2 embeddings"));
    }
}
