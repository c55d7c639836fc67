//! alttext-core - alt text for images from hosted vision-language models.
//!
//! Each request is a stateless pass-through: the upload is validated,
//! normalized, sent to the configured vision provider, and the caption is cut
//! to the requested word limit.
//!
//! ```text
//! Upload → Validate → Decode → Orient → Resize/Encode → Provider → Truncate → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use alttext_core::{AltTextGenerator, Config};
//!
//! #[tokio::main]
//! async fn main() -> alttext_core::Result<()> {
//!     let config = Config::load()?;
//!     let generator = AltTextGenerator::from_config(&config, None, None)?;
//!
//!     let bytes = std::fs::read("./photo.jpg")?;
//!     let alt = generator.generate(bytes, Some(15)).await?;
//!     println!("{}", alt.alt_text);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod caption;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;

// Re-exports for convenient access
pub use api::{router, serve, AppState};
pub use caption::{AltText, AltTextGenerator};
pub use config::Config;
pub use error::{AltTextError, ConfigError, PipelineError, PipelineResult, Result};
pub use llm::{ProviderFactory, VisionProvider};
pub use output::{DescribeRecord, OutputFormat, OutputWriter};
pub use pipeline::{FileDiscovery, ImagePreparer, PreparedImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.caption.default_word_limit, 20);
    }
}
