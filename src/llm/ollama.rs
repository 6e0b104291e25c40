//! Ollama `/api/generate` client.
//!
//! Talks to a local (or proxied) Ollama server using non-streaming
//! generation requests.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::llm::provider::{GenerationRequest, ReasoningService};

const PROVIDER: &str = "ollama";

/// Ollama generation client.
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
}

impl OllamaClient {
    /// Create a new client. The configured timeout applies to every request.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Unreachable {
                provider: PROVIDER.to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key.expose_secret())),
            None => builder,
        }
    }

    fn classify(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                provider: PROVIDER.to_string(),
                timeout: self.config.timeout,
            }
        } else {
            LlmError::Unreachable {
                provider: PROVIDER.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Read a response body, mapping non-success statuses and bad JSON.
    async fn read_json<R: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, LlmError> {
        let status = response.status();
        let response_text = response.text().await.map_err(|e| self.classify(e))?;

        tracing::debug!("Ollama response status: {}", status);
        tracing::debug!("Ollama response body: {}", response_text);

        if !status.is_success() {
            return Err(LlmError::NonSuccessStatus {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body: response_text,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| LlmError::MalformedResponse {
            provider: PROVIDER.to_string(),
            reason: format!("JSON parse error: {}. Raw: {}", e, response_text),
        })
    }
}

#[async_trait]
impl ReasoningService for OllamaClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        let url = self.api_url("generate");
        let body = GenerateRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.options.temperature,
                num_predict: request.options.max_tokens,
                top_p: request.options.top_p,
            },
        };

        tracing::debug!(model = %self.config.model, "Sending request to Ollama: {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                self.classify(e)
            })?;

        let generated: GenerateResponse = self.read_json(response).await?;
        Ok(generated.response)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = self.api_url("tags");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let tags: TagsResponse = self.read_json(response).await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    use super::*;
    use crate::llm::SamplingOptions;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String, timeout: Duration) -> OllamaClient {
        OllamaClient::new(LlmConfig {
            base_url,
            model: "phi".to_string(),
            api_key: None,
            timeout,
        })
        .unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("hello", SamplingOptions::new(0.3, 20).with_top_p(0.9))
    }

    #[tokio::test]
    async fn test_generate_sends_non_streaming_request() {
        let router = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["stream"], serde_json::json!(false));
                Json(serde_json::json!({
                    "response": format!(
                        "{}:{}:{}",
                        body["model"].as_str().unwrap_or_default(),
                        body["prompt"].as_str().unwrap_or_default(),
                        body["options"]["num_predict"]
                    )
                }))
            }),
        );
        let client = client_for(spawn_server(router).await, Duration::from_secs(5));

        let text = client.generate(request()).await.unwrap();
        assert_eq!(text, "phi:hello:20");
    }

    #[tokio::test]
    async fn test_non_success_status_is_classified() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
        );
        let client = client_for(spawn_server(router).await, Duration::from_secs(5));

        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::NonSuccessStatus { status: 500, .. }));
        assert!(!err.is_unavailable());
    }

    #[tokio::test]
    async fn test_malformed_body_is_classified() {
        let router = Router::new().route("/api/generate", post(|| async { "not json" }));
        let client = client_for(spawn_server(router).await, Duration::from_secs(5));

        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_classified() {
        // Grab a free port, then close the listener so nothing answers on it.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}", addr), Duration::from_secs(5));
        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Unreachable { .. }));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(serde_json::json!({ "response": "late" }))
            }),
        );
        let client = client_for(spawn_server(router).await, Duration::from_millis(100));

        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_list_models() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async {
                Json(serde_json::json!({
                    "models": [{ "name": "phi:latest" }, { "name": "llama3.2:latest" }]
                }))
            }),
        );
        let client = client_for(spawn_server(router).await, Duration::from_secs(5));

        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["phi:latest", "llama3.2:latest"]);
    }
}
