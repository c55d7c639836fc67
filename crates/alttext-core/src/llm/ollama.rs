//! Ollama vision provider for local model inference.
//!
//! Talks to a local Ollama instance via its HTTP API.
//! No authentication required, just Ollama running locally.

use super::provider::{send_error, CaptionRequest, LlmResponse, VisionProvider};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Ollama provider for local vision model inference.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn build_body(&self, request: &CaptionRequest) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            images: vec![request.image.data.clone()],
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

/// Ollama /api/generate request body.
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    images: Vec<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama /api/generate response.
#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[async_trait]
impl VisionProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        match self.client.get(&url).timeout(Duration::from_secs(5)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn generate(&self, request: &CaptionRequest) -> Result<LlmResponse, PipelineError> {
        let url = format!("{}/api/generate", self.endpoint);
        let start = Instant::now();
        let body = self.build_body(request);

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("Ollama", self.timeout, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Llm {
                message: format!("Ollama HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let ollama_resp: OllamaResponse =
            resp.json().await.map_err(|e| PipelineError::Llm {
                message: format!("Failed to parse Ollama response: {e}"),
                status_code: None,
            })?;

        let text = ollama_resp.response.trim().to_string();
        if text.is_empty() {
            return Err(PipelineError::Llm {
                message: "Ollama returned empty response; no content generated".to_string(),
                status_code: None,
            });
        }

        let tokens_used = match (ollama_resp.prompt_eval_count, ollama_resp.eval_count) {
            (Some(p), Some(e)) => Some(p + e),
            (None, Some(e)) => Some(e),
            _ => None,
        };

        Ok(LlmResponse {
            text,
            model: self.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageInput;

    #[test]
    fn test_body_shape() {
        let provider = OllamaProvider::new(
            "http://localhost:11434/",
            "llava",
            Duration::from_secs(120),
        );
        let request = CaptionRequest {
            image: ImageInput::from_bytes(&[1, 2, 3], "jpeg"),
            prompt: "Describe".to_string(),
            max_tokens: 50,
            temperature: 0.1,
        };
        let body = serde_json::to_value(provider.build_body(&request)).unwrap();

        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(body["images"][0], "AQID");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 50);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let provider = OllamaProvider::new("http://127.0.0.1:1", "llava", Duration::from_secs(5));
        let request = CaptionRequest {
            image: ImageInput::from_bytes(&[1, 2, 3], "jpeg"),
            prompt: "Describe".to_string(),
            max_tokens: 50,
            temperature: 0.1,
        };

        assert!(!provider.is_available().await);
        let err = provider.generate(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::ProviderUnreachable { .. }), "unexpected error: {err}");
    }
}
