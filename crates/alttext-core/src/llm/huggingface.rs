//! Hugging Face Inference API provider for image-to-text models.
//!
//! Captioning models such as BLIP take the raw image as the request body and
//! ignore free-form prompts, so the word limit is enforced only afterwards
//! by truncation.

use super::provider::{send_error, CaptionRequest, LlmResponse, VisionProvider};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Hugging Face hosted inference provider.
pub struct HuggingFaceProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HuggingFaceProvider {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }
}

/// One element of the image-to-text response array.
#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

/// Responses come back as `[{"generated_text": ...}]`; some deployments
/// return the bare object instead.
#[derive(Deserialize)]
#[serde(untagged)]
enum GeneratedResponse {
    Many(Vec<Generated>),
    One(Generated),
}

fn extract_text(resp: GeneratedResponse) -> Result<String, PipelineError> {
    let text = match resp {
        GeneratedResponse::Many(items) => items
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .unwrap_or_default(),
        GeneratedResponse::One(item) => item.generated_text,
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(PipelineError::Llm {
            message: "Hugging Face returned empty generated_text".to_string(),
            status_code: None,
        });
    }
    Ok(text.to_string())
}

#[async_trait]
impl VisionProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &CaptionRequest) -> Result<LlmResponse, PipelineError> {
        let start = Instant::now();

        let resp = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .header("Content-Type", request.image.media_type.as_str())
            .body(request.image.raw.clone())
            .send()
            .await
            .map_err(|e| send_error("Hugging Face", self.timeout, e))?;

        let status = resp.status();
        if !status.is_success() {
            // 503 while the model is loading is retryable like any other 5xx
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Llm {
                message: format!("Hugging Face HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let generated: GeneratedResponse = resp.json().await.map_err(|e| PipelineError::Llm {
            message: format!("Failed to parse Hugging Face response: {e}"),
            status_code: None,
        })?;
        let text = extract_text(generated)?;

        Ok(LlmResponse {
            text,
            model: self.model.clone(),
            tokens_used: None,
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

    #[test]
    fn test_url_joins_model() {
        let provider = HuggingFaceProvider::new(
            "https://api-inference.huggingface.co/models/",
            "hf_x",
            "Salesforce/blip-image-captioning-large",
            Duration::from_secs(5),
        );
        assert_eq!(
            provider.url(),
            "https://api-inference.huggingface.co/models/Salesforce/blip-image-captioning-large"
        );
    }

    #[test]
    fn test_extract_text_array() {
        let resp: GeneratedResponse =
            serde_json::from_str(r#"[{"generated_text": "a dog running on the grass "}]"#).unwrap();
        assert_eq!(extract_text(resp).unwrap(), "a dog running on the grass");
    }

    #[test]
    fn test_extract_text_object() {
        let resp: GeneratedResponse =
            serde_json::from_str(r#"{"generated_text": "a bowl of fruit"}"#).unwrap();
        assert_eq!(extract_text(resp).unwrap(), "a bowl of fruit");
    }

    #[test]
    fn test_extract_text_empty_array() {
        let resp: GeneratedResponse = serde_json::from_str("[]").unwrap();
        assert!(extract_text(resp).is_err());
    }
}
