//! Subcommand implementations.

pub mod config;
pub mod describe;
pub mod serve;

use clap::ValueEnum;

/// Supported vision providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// OpenAI Chat Completions
    Openai,
    /// Anthropic Messages API
    Anthropic,
    /// Google Gemini
    Gemini,
    /// Hyperbolic (OpenAI-compatible)
    Hyperbolic,
    /// Hugging Face Inference API
    Huggingface,
    /// Local Ollama instance
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Openai => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::Hyperbolic => "hyperbolic",
            Provider::Huggingface => "huggingface",
            Provider::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
