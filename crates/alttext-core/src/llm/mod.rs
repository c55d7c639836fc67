//! Vision-language model integration.
//!
//! Provides a provider abstraction over hosted captioning backends (OpenAI,
//! Anthropic, Gemini, Hyperbolic, Hugging Face) and a local one (Ollama),
//! plus retry classification for transient failures.

pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod huggingface;
pub(crate) mod hyperbolic;
pub(crate) mod ollama;
pub(crate) mod openai;
pub mod provider;
pub mod retry;

pub use provider::{
    CaptionRequest, ImageInput, LlmResponse, ProviderFactory, VisionProvider,
};
