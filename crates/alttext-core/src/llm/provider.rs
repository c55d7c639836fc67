//! Vision provider trait and request/response types.
//!
//! Defines the interface that all hosted vision-language backends implement,
//! plus the factory that builds the configured one.

use crate::config::Config;
use crate::error::PipelineError;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Image ready to send to a vision API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
    /// Raw bytes, for APIs that take the image as the request body
    pub raw: Vec<u8>,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type_for(format).to_string(),
            raw: bytes.to_vec(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// MIME type for an image format identifier.
pub fn media_type_for(format: &str) -> &'static str {
    match format {
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        other => {
            tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
            "image/jpeg"
        }
    }
}

/// A request to caption an image.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    /// The image to describe
    pub image: ImageInput,
    /// Instruction prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// The response from a caption call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text, trimmed
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the server holds an `Arc<dyn VisionProvider>`).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "anthropic", "ollama").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Generate a caption for the given request.
    async fn generate(&self, request: &CaptionRequest) -> Result<LlmResponse, PipelineError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Environment variable conventionally holding the API key for `provider`.
pub fn env_var_for(provider: &str) -> &'static str {
    match provider {
        "openai" => "OPENAI_API_KEY",
        "anthropic" => "ANTHROPIC_API_KEY",
        "gemini" => "GEMINI_API_KEY",
        "hyperbolic" => "HYPERBOLIC_API_KEY",
        "huggingface" => "HF_API_TOKEN",
        _ => "OLLAMA_HOST",
    }
}

/// Human-readable provider label for messages.
pub fn provider_label(provider: &str) -> &'static str {
    match provider {
        "openai" => "OpenAI",
        "anthropic" => "Anthropic",
        "gemini" => "Gemini",
        "hyperbolic" => "Hyperbolic",
        "huggingface" => "Hugging Face",
        "ollama" => "Ollama",
        _ => "Unknown",
    }
}

/// Factory that creates the configured provider.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a vision provider from config with optional CLI overrides.
    ///
    /// # Arguments
    /// * `config` - Full config; `llm` selects the provider, `limits` sets the timeout
    /// * `provider_override` - Provider name that overrides `llm.provider`
    /// * `model_override` - Model name that overrides `llm.model` and the provider section
    pub fn create(
        config: &Config,
        provider_override: Option<&str>,
        model_override: Option<&str>,
    ) -> Result<Box<dyn VisionProvider>, PipelineError> {
        let provider = provider_override.unwrap_or(&config.llm.provider);
        let section = config
            .llm
            .resolve(provider)
            .ok_or_else(|| PipelineError::UnknownProvider(provider.to_string()))?;
        let model = model_override
            .map(String::from)
            .or_else(|| config.llm.model.clone())
            .unwrap_or(section.model.clone());
        let timeout = Duration::from_millis(config.limits.llm_timeout_ms);

        if provider == "ollama" {
            return Ok(Box::new(super::ollama::OllamaProvider::new(
                &section.endpoint,
                &model,
                timeout,
            )));
        }

        let api_key = resolve_env_var(&section.api_key).ok_or_else(|| {
            PipelineError::MissingApiKey {
                provider: provider_label(provider).to_string(),
                env_var: template_var(&section.api_key)
                    .unwrap_or(env_var_for(provider))
                    .to_string(),
            }
        })?;

        let provider: Box<dyn VisionProvider> = match provider {
            "openai" => Box::new(super::openai::OpenAiProvider::with_endpoint(
                &api_key,
                &model,
                &section.endpoint,
                timeout,
            )),
            "anthropic" => Box::new(super::anthropic::AnthropicProvider::new(
                &section.endpoint,
                &api_key,
                &model,
                timeout,
            )),
            "gemini" => Box::new(super::gemini::GeminiProvider::new(
                &section.endpoint,
                &api_key,
                &model,
                timeout,
            )),
            "hyperbolic" => Box::new(super::hyperbolic::HyperbolicProvider::new(
                &section.endpoint,
                &api_key,
                &model,
                timeout,
            )),
            "huggingface" => Box::new(super::huggingface::HuggingFaceProvider::new(
                &section.endpoint,
                &api_key,
                &model,
                timeout,
            )),
            other => return Err(PipelineError::UnknownProvider(other.to_string())),
        };
        Ok(provider)
    }
}

/// Classify a failed `send()` so retries can tell transient failures apart.
///
/// `timeout` is reported for reqwest-side timeouts; requests normally rely on
/// the caller's deadline instead.
pub(crate) fn send_error(provider: &str, timeout: Duration, err: reqwest::Error) -> PipelineError {
    if err.is_timeout() {
        return PipelineError::Timeout {
            stage: "llm".to_string(),
            timeout_ms: timeout.as_millis() as u64,
        };
    }
    if err.is_connect() {
        return PipelineError::ProviderUnreachable {
            provider: provider.to_string(),
            message: error_chain(&err),
        };
    }
    PipelineError::Llm {
        message: format!("{provider} request failed: {}", error_chain(&err)),
        status_code: err.status().map(|s| s.as_u16()),
    }
}

/// reqwest's `Display` omits the underlying cause; append the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Variable name inside a `${VAR}` template, if the value is one.
fn template_var(value: &str) -> Option<&str> {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_input_from_bytes_jpeg() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "jpeg");
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(input.data, "/9j/");
        assert_eq!(input.raw, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_image_input_from_bytes_png() {
        let input = ImageInput::from_bytes(&[0x89, 0x50, 0x4E, 0x47], "png");
        assert_eq!(input.media_type, "image/png");
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "jpeg");
        assert_eq!(input.data_url(), "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_template_var() {
        assert_eq!(template_var("${MY_KEY}"), Some("MY_KEY"));
        assert_eq!(template_var("sk-literal"), None);
    }

    #[test]
    fn test_factory_missing_key_names_env_var() {
        let mut config = Config::default();
        config.llm.openai.api_key = "${ALTTEXT_TEST_UNSET_OPENAI_KEY}".to_string();

        let err = ProviderFactory::create(&config, None, None)
            .err()
            .expect("missing key must fail");
        assert!(matches!(err, PipelineError::MissingApiKey { .. }));
        assert_eq!(
            err.to_string(),
            "OpenAI API key not set. Set ALTTEXT_TEST_UNSET_OPENAI_KEY env var."
        );
    }

    #[test]
    fn test_factory_literal_key_and_model_override() {
        let mut config = Config::default();
        config.llm.anthropic.api_key = "sk-ant-literal".to_string();

        let provider =
            ProviderFactory::create(&config, Some("anthropic"), Some("claude-test")).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "claude-test");
        assert_eq!(provider.timeout(), Duration::from_millis(60000));
    }

    #[test]
    fn test_factory_ollama_needs_no_key() {
        let provider = ProviderFactory::create(&Config::default(), Some("ollama"), None).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "llama3.2-vision");
    }

    #[test]
    fn test_factory_unknown_provider() {
        let err = ProviderFactory::create(&Config::default(), Some("mystery"), None)
            .err()
            .expect("unknown provider must fail");
        assert!(matches!(err, PipelineError::UnknownProvider(ref name) if name == "mystery"));
        assert_eq!(err.kind(), "configuration_error");
    }
}
