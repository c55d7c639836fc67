//! Alt-text generation: image preparation, provider call with retries, and
//! word-limit enforcement.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::words::{build_prompt, max_tokens_for, truncate_words, word_count};
use crate::config::{CaptionConfig, Config, PipelineConfig};
use crate::error::PipelineError;
use crate::llm::provider::{CaptionRequest, ImageInput, LlmResponse, VisionProvider};
use crate::llm::{retry, ProviderFactory};
use crate::pipeline::ImagePreparer;

/// A generated caption and how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct AltText {
    /// Caption, trimmed and truncated to the word limit
    pub alt_text: String,
    /// Words in `alt_text`
    pub word_count: usize,
    /// Word limit that was applied
    pub word_limit: usize,
    /// Whether the model's text was cut to fit the limit
    pub truncated: bool,
    /// Provider name
    pub provider: String,
    /// Model that produced the caption
    pub model: String,
    /// Provider round-trip latency of the successful attempt
    pub latency_ms: u64,
    /// Tokens used, if the provider reports them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

/// Turns uploaded image bytes into alt text.
///
/// Stateless apart from configuration; share it behind an `Arc`.
pub struct AltTextGenerator {
    preparer: ImagePreparer,
    provider: Arc<dyn VisionProvider>,
    caption: CaptionConfig,
    retry: PipelineConfig,
}

impl AltTextGenerator {
    /// Create a generator around an already-built provider.
    pub fn new(config: &Config, provider: Box<dyn VisionProvider>) -> Self {
        Self {
            preparer: ImagePreparer::new(config),
            provider: Arc::from(provider),
            caption: config.caption.clone(),
            retry: config.pipeline.clone(),
        }
    }

    /// Build the configured provider and wrap it in a generator.
    pub fn from_config(
        config: &Config,
        provider_override: Option<&str>,
        model_override: Option<&str>,
    ) -> Result<Self, PipelineError> {
        let provider = ProviderFactory::create(config, provider_override, model_override)?;
        Ok(Self::new(config, provider))
    }

    /// The provider captions are requested from.
    pub fn provider(&self) -> &dyn VisionProvider {
        self.provider.as_ref()
    }

    /// Apply the default and check the allowed range for a requested word limit.
    pub fn resolve_word_limit(&self, requested: Option<usize>) -> Result<usize, PipelineError> {
        let limit = requested.unwrap_or(self.caption.default_word_limit);
        if limit == 0 || limit > self.caption.max_word_limit {
            return Err(PipelineError::InvalidField {
                field: "word_limit".to_string(),
                message: format!(
                    "must be between 1 and {}, got {limit}",
                    self.caption.max_word_limit
                ),
            });
        }
        Ok(limit)
    }

    /// Generate alt text for an uploaded image.
    pub async fn generate(
        &self,
        bytes: Vec<u8>,
        word_limit: Option<usize>,
    ) -> Result<AltText, PipelineError> {
        let start = Instant::now();
        let word_limit = self.resolve_word_limit(word_limit)?;

        let prepared = self.preparer.prepare(bytes).await?;
        let hash = &prepared.content_hash[..12];

        let request = CaptionRequest {
            image: ImageInput::from_bytes(&prepared.bytes, &prepared.format),
            prompt: build_prompt(&self.caption.prompt, word_limit),
            max_tokens: max_tokens_for(word_limit, self.caption.max_tokens),
            temperature: self.caption.temperature,
        };

        let response = self.call_with_retry(&request, hash).await?;
        let (alt_text, truncated) = truncate_words(&response.text, word_limit);

        tracing::info!(
            hash,
            provider = self.provider.name(),
            model = %response.model,
            words = word_count(&alt_text),
            truncated,
            llm_ms = response.latency_ms,
            total_ms = start.elapsed().as_millis() as u64,
            "Generated alt text"
        );

        Ok(AltText {
            word_count: word_count(&alt_text),
            alt_text,
            word_limit,
            truncated,
            provider: self.provider.name().to_string(),
            model: response.model,
            latency_ms: response.latency_ms,
            tokens_used: response.tokens_used,
        })
    }

    /// Call the provider, retrying transient failures with backoff.
    async fn call_with_retry(
        &self,
        request: &CaptionRequest,
        hash: &str,
    ) -> Result<LlmResponse, PipelineError> {
        let timeout = self.provider.timeout();
        let mut last_error = None;

        for attempt in 0..=self.retry.retry_attempts {
            if attempt > 0 {
                let delay = retry::with_jitter(retry::backoff_duration(
                    attempt - 1,
                    self.retry.retry_delay_ms,
                ));
                tracing::debug!(
                    hash,
                    "Retry {attempt}/{} after {delay:?}",
                    self.retry.retry_attempts
                );
                tokio::time::sleep(delay).await;
            }

            let error = match tokio::time::timeout(timeout, self.provider.generate(request)).await
            {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => e,
                Err(_) => timeout_error(timeout),
            };

            tracing::warn!(hash, provider = self.provider.name(), attempt, "Caption attempt failed: {error}");
            let retryable = retry::is_retryable(&error);
            last_error = Some(error);
            if !retryable {
                break;
            }
        }

        Err(last_error.unwrap_or_else(|| timeout_error(timeout)))
    }
}

fn timeout_error(timeout: Duration) -> PipelineError {
    PipelineError::Timeout {
        stage: "llm".to_string(),
        timeout_ms: timeout.as_millis() as u64,
    }
}
