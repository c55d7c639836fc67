//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port (overridden by the `PORT` env var)
    pub port: u16,

    /// Origins allowed by CORS; `"*"` allows any origin
    pub cors_allowed_origins: Vec<String>,

    /// Whole-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["*".to_string()],
            request_timeout_ms: 120_000,
        }
    }
}

/// Caption generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Word limit used when the request does not send one
    pub default_word_limit: usize,

    /// Largest word limit a request may ask for
    pub max_word_limit: usize,

    /// Instruction sent with the image. `{word_limit}` is substituted.
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            default_word_limit: 20,
            max_word_limit: 100,
            prompt: "Write alt text for this image in at most {word_limit} words. \
                     Describe the main subject and any important context or visible text. \
                     Do not start with \"Image of\" or \"Picture of\". \
                     Reply with the alt text only."
                .to_string(),
            temperature: 0.2,
            max_tokens: 300,
        }
    }
}

/// Image normalization applied before upload to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Longest edge in pixels after resizing; 0 keeps the original size
    pub max_edge: u32,

    /// Re-encode format sent to the provider ("jpeg" or "png")
    pub format: String,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Rotate/flip according to the EXIF orientation tag
    pub apply_orientation: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_edge: 1024,
            format: "jpeg".to_string(),
            jpeg_quality: 85,
            apply_orientation: true,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Provider call timeout in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            llm_timeout_ms: 60000,
        }
    }
}

impl LimitsConfig {
    /// Maximum upload size in bytes.
    pub fn max_file_size_bytes(&self) -> usize {
        usize::try_from(self.max_file_size_mb)
            .unwrap_or(usize::MAX)
            .saturating_mul(1024 * 1024)
    }
}

/// Retry settings for transient provider failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max retry attempts after the first call
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 2,
            retry_delay_ms: 500,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Vision provider selection and per-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Active provider: openai, anthropic, gemini, hyperbolic, huggingface, ollama
    pub provider: String,

    /// Model override applied on top of the provider section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    pub gemini: ProviderConfig,
    pub hyperbolic: ProviderConfig,
    pub huggingface: ProviderConfig,
    pub ollama: ProviderConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            openai: ProviderConfig::openai(),
            anthropic: ProviderConfig::anthropic(),
            gemini: ProviderConfig::gemini(),
            hyperbolic: ProviderConfig::hyperbolic(),
            huggingface: ProviderConfig::huggingface(),
            ollama: ProviderConfig::ollama(),
        }
    }
}

impl LlmConfig {
    /// Names of every supported provider.
    pub const PROVIDERS: [&'static str; 6] = [
        "openai",
        "anthropic",
        "gemini",
        "hyperbolic",
        "huggingface",
        "ollama",
    ];

    /// Look up the settings section for a provider by name.
    pub fn section(&self, provider: &str) -> Option<&ProviderConfig> {
        match provider {
            "openai" => Some(&self.openai),
            "anthropic" => Some(&self.anthropic),
            "gemini" => Some(&self.gemini),
            "hyperbolic" => Some(&self.hyperbolic),
            "huggingface" => Some(&self.huggingface),
            "ollama" => Some(&self.ollama),
            _ => None,
        }
    }

    /// Settings for `provider` with empty fields filled from its defaults.
    pub fn resolve(&self, provider: &str) -> Option<ProviderConfig> {
        let defaults = ProviderConfig::defaults_for(provider)?;
        let section = self.section(provider)?.clone();
        Some(section.or(defaults))
    }

    /// Model that will be used for `provider`, honoring the global override.
    pub fn model_for(&self, provider: &str) -> Option<String> {
        self.model
            .clone()
            .or_else(|| self.resolve(provider).map(|s| s.model))
    }
}

/// Settings for one provider.
///
/// Fields left empty in the config file fall back to the provider's defaults,
/// so a section may set only `api_key` or only `model`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API base URL or full endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl ProviderConfig {
    /// Built-in defaults for a provider name.
    pub fn defaults_for(provider: &str) -> Option<Self> {
        match provider {
            "openai" => Some(Self::openai()),
            "anthropic" => Some(Self::anthropic()),
            "gemini" => Some(Self::gemini()),
            "hyperbolic" => Some(Self::hyperbolic()),
            "huggingface" => Some(Self::huggingface()),
            "ollama" => Some(Self::ollama()),
            _ => None,
        }
    }

    fn or(self, fallback: Self) -> Self {
        fn pick(value: String, fallback: String) -> String {
            if value.trim().is_empty() {
                fallback
            } else {
                value
            }
        }
        Self {
            endpoint: pick(self.endpoint, fallback.endpoint),
            api_key: pick(self.api_key, fallback.api_key),
            model: pick(self.model, fallback.model),
        }
    }

    pub fn openai() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn anthropic() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
        }
    }

    pub fn gemini() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-2.0-flash".to_string(),
        }
    }

    pub fn hyperbolic() -> Self {
        Self {
            endpoint: "https://api.hyperbolic.xyz/v1".to_string(),
            api_key: "${HYPERBOLIC_API_KEY}".to_string(),
            model: "Qwen/Qwen2.5-VL-7B-Instruct".to_string(),
        }
    }

    pub fn huggingface() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            api_key: "${HF_API_TOKEN}".to_string(),
            model: "Salesforce/blip-image-captioning-large".to_string(),
        }
    }

    pub fn ollama() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            api_key: String::new(),
            model: "llama3.2-vision".to_string(),
        }
    }
}
