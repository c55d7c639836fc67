//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, LlmConfig};

/// Largest accepted upload limit, in megabytes.
const MAX_FILE_SIZE_MB: u64 = 1024;

/// Retries beyond this only delay the inevitable error.
const MAX_RETRY_ATTEMPTS: u32 = 10;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "server.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.caption.default_word_limit == 0 {
            return Err(ConfigError::ValidationError(
                "caption.default_word_limit must be > 0".into(),
            ));
        }
        if self.caption.max_word_limit < self.caption.default_word_limit {
            return Err(ConfigError::ValidationError(
                "caption.max_word_limit must be >= caption.default_word_limit".into(),
            ));
        }
        if self.caption.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "caption.max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.caption.temperature) {
            return Err(ConfigError::ValidationError(
                "caption.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if !matches!(self.image.format.as_str(), "jpeg" | "jpg" | "png") {
            return Err(ConfigError::ValidationError(format!(
                "image.format must be \"jpeg\" or \"png\", got {:?}",
                self.image.format
            )));
        }
        if self.image.jpeg_quality == 0 || self.image.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "image.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 || self.limits.max_file_size_mb > MAX_FILE_SIZE_MB {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_file_size_mb must be between 1 and {MAX_FILE_SIZE_MB}"
            )));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.llm_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.llm_timeout_ms must be > 0".into(),
            ));
        }
        if self.pipeline.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::ValidationError(format!(
                "pipeline.retry_attempts must be at most {MAX_RETRY_ATTEMPTS}"
            )));
        }
        if !LlmConfig::PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "llm.provider must be one of {}, got {:?}",
                LlmConfig::PROVIDERS.join(", "),
                self.llm.provider
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_word_limit() {
        let mut config = Config::default();
        config.caption.default_word_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_word_limit"));
    }

    #[test]
    fn test_validate_rejects_max_below_default() {
        let mut config = Config::default();
        config.caption.max_word_limit = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_word_limit"));
    }

    #[test]
    fn test_validate_rejects_unknown_image_format() {
        let mut config = Config::default();
        config.image.format = "tiff".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("image.format"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "mystery".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.provider"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut config = Config::default();
        config.caption.temperature = 3.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validate_rejects_zero_request_timeout() {
        let mut config = Config::default();
        config.server.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
    }

    #[test]
    fn test_validate_bounds_file_size() {
        let mut config = Config::default();
        config.limits.max_file_size_mb = 1024;
        assert!(config.validate().is_ok());

        config.limits.max_file_size_mb = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_file_size_mb"));
    }

    #[test]
    fn test_validate_bounds_retry_attempts() {
        let mut config = Config::default();
        config.pipeline.retry_attempts = 10;
        assert!(config.validate().is_ok());

        config.pipeline.retry_attempts = 1_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retry_attempts"));
    }
}
