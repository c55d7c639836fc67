//! OpenAI vision provider using the Chat Completions API.
//!
//! Sends the image as a data URL in the user message content array.

use super::provider::{send_error, CaptionRequest, LlmResponse, VisionProvider};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI provider using the Chat Completions API.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiProvider {
    /// `endpoint` is the full Chat Completions URL, so Hyperbolic and other
    /// OpenAI-compatible servers can reuse this provider.
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    fn build_body(&self, request: &CaptionRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: request.prompt.clone(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_url(),
                        },
                    },
                ],
            }],
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

/// Pull the caption out of the first choice.
fn extract_text(chat_resp: &ChatResponse) -> Result<String, PipelineError> {
    let text = chat_resp
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .map(str::trim)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(PipelineError::Llm {
            message: "OpenAI returned empty choices array; no content generated".to_string(),
            status_code: None,
        });
    }
    Ok(text.to_string())
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &CaptionRequest) -> Result<LlmResponse, PipelineError> {
        let start = Instant::now();
        let body = self.build_body(request);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("OpenAI", self.timeout, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Llm {
                message: format!("OpenAI HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| PipelineError::Llm {
            message: format!("Failed to parse OpenAI response: {e}"),
            status_code: None,
        })?;
        let text = extract_text(&chat_resp)?;

        Ok(LlmResponse {
            text,
            model: chat_resp.model,
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
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

    fn request() -> CaptionRequest {
        CaptionRequest {
            image: ImageInput::from_bytes(&[1, 2, 3], "jpeg"),
            prompt: "Describe".to_string(),
            max_tokens: 60,
            temperature: 0.2,
        }
    }

    #[test]
    fn test_body_shape() {
        let provider = OpenAiProvider::with_endpoint(
            "sk-test",
            "gpt-4o-mini",
            "https://api.openai.com/v1/chat/completions",
            Duration::from_secs(5),
        );
        let body = serde_json::to_value(provider.build_body(&request())).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 60);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "Describe");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_extract_text_trims() {
        let resp: ChatResponse = serde_json::from_value(serde_json::json!({
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"message": {"role": "assistant", "content": "  A red kite over a beach.\n"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 7, "total_tokens": 17}
        }))
        .unwrap();
        assert_eq!(extract_text(&resp).unwrap(), "A red kite over a beach.");
    }

    #[test]
    fn test_extract_text_empty_choices() {
        let resp: ChatResponse = serde_json::from_value(serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": []
        }))
        .unwrap();
        assert!(extract_text(&resp).is_err());
    }

    #[test]
    fn test_extract_text_null_content() {
        let resp: ChatResponse = serde_json::from_value(serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": null}}]
        }))
        .unwrap();
        assert!(extract_text(&resp).is_err());
    }

    #[tokio::test]
    async fn test_refused_connection_is_retryable() {
        // Nothing listens on port 1.
        let provider = OpenAiProvider::with_endpoint(
            "sk-test",
            "gpt-4o-mini",
            "http://127.0.0.1:1/v1/chat/completions",
            Duration::from_secs(5),
        );

        let err = provider.generate(&request()).await.unwrap_err();
        assert!(
            matches!(err, PipelineError::ProviderUnreachable { ref provider, .. } if provider == "OpenAI"),
            "unexpected error: {err}"
        );
        assert!(crate::llm::retry::is_retryable(&err));
    }
}
