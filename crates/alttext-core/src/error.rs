//! Error types for the alt-text pipeline.
//!
//! Errors are organized by stage so that the HTTP layer can map each one to
//! a status code and a stable error kind without inspecting message text.

use thiserror::Error;

/// Top-level error type for alt-text operations.
#[derive(Error, Debug)]
pub enum AltTextError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-request pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The upload contained no bytes
    #[error("Uploaded file is empty")]
    EmptyUpload,

    /// A required form field was not sent
    #[error("Missing form field: {0}")]
    MissingField(String),

    /// A form field could not be interpreted
    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },

    /// Upload exceeds size limit
    #[error("File too large ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    /// Image dimensions exceed limit
    #[error("Image too large ({width}x{height} > {max_dim})")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Bytes are not a recognized image format
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Image decoding failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Re-encoding the prepared image failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// Provider needs an API key and none was configured
    #[error("{provider} API key not set. Set {env_var} env var.")]
    MissingApiKey { provider: String, env_var: String },

    /// Provider name is not one this build knows
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The provider could not be reached (refused, DNS, TLS)
    #[error("{provider} unreachable: {message}")]
    ProviderUnreachable { provider: String, message: String },

    /// Vision provider call failed
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },
}

impl PipelineError {
    /// Stable, machine-readable error kind used as the `error` field of API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyUpload => "empty_upload",
            Self::MissingField(_) | Self::InvalidField { .. } => "invalid_request",
            Self::FileTooLarge { .. } | Self::ImageTooLarge { .. } => "payload_too_large",
            Self::UnsupportedFormat(_) => "unsupported_media_type",
            Self::Decode(_) => "invalid_image",
            Self::Encode(_) => "processing_error",
            Self::Timeout { .. } => "timeout",
            Self::MissingApiKey { .. } | Self::UnknownProvider(_) => "configuration_error",
            Self::ProviderUnreachable { .. } | Self::Llm { .. } => "provider_error",
        }
    }

    /// HTTP status code this error maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::EmptyUpload | Self::MissingField(_) | Self::InvalidField { .. } => 400,
            Self::FileTooLarge { .. } | Self::ImageTooLarge { .. } => 413,
            Self::UnsupportedFormat(_) => 415,
            Self::Decode(_) => 422,
            Self::Encode(_) | Self::MissingApiKey { .. } | Self::UnknownProvider(_) => 500,
            Self::ProviderUnreachable { .. } | Self::Llm { .. } => 502,
            Self::Timeout { .. } => 504,
        }
    }
}

/// Convenience type alias for alt-text results.
pub type Result<T> = std::result::Result<T, AltTextError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
