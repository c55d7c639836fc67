//! Configuration management for the alt-text service.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults, then a handful of environment variables are layered on top so
//! hosted deployments can be configured without a file.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Caption prompt and word limit settings
    pub caption: CaptionConfig,

    /// Image normalization settings
    pub image: ImageConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Retry settings
    pub pipeline: PipelineConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Vision provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location, then apply env overrides.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.alttext.alttext/config.toml
    /// - Linux: ~/.config/alttext/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\alttext\config\config.toml
    ///
    /// Falls back to ~/.alttext/config.toml if directory detection fails.
    /// `ALTTEXT_CONFIG` takes precedence over both.
    pub fn default_path() -> PathBuf {
        if let Ok(explicit) = std::env::var("ALTTEXT_CONFIG") {
            return PathBuf::from(shellexpand::tilde(&explicit).into_owned());
        }
        directories::ProjectDirs::from("com", "alttext", "alttext")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".alttext").join("config.toml")
            })
    }

    /// Layer environment variables over file values.
    ///
    /// Recognized: `HOST`, `PORT`, `ALTTEXT_PROVIDER`, `ALTTEXT_MODEL`.
    /// The lookup is injected so tests don't have to mutate the process env.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|v| !v.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {port:?}"),
            }
        }
        if let Some(provider) = lookup("ALTTEXT_PROVIDER").filter(|v| !v.is_empty()) {
            self.llm.provider = provider.to_lowercase();
        }
        if let Some(model) = lookup("ALTTEXT_MODEL").filter(|v| !v.is_empty()) {
            self.llm.model = Some(model);
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.caption.default_word_limit, 20);
        assert_eq!(config.limits.max_file_size_mb, 20);
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[caption]"));
        assert!(toml.contains("[llm.openai]"));
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9001

[llm]
provider = "anthropic"

[llm.anthropic]
api_key = "sk-ant-test"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.provider, "anthropic");

        let anthropic = config.llm.resolve("anthropic").unwrap();
        assert_eq!(anthropic.api_key, "sk-ant-test");
        assert_eq!(anthropic.endpoint, "https://api.anthropic.com/v1/messages");
        assert_eq!(anthropic.model, ProviderConfig::anthropic().model);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[caption]\ndefault_word_limit = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("default_word_limit"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("PORT", "10000"),
            ("ALTTEXT_PROVIDER", "Gemini"),
            ("ALTTEXT_MODEL", "gemini-1.5-pro"),
        ]));
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(
            config.llm.model_for("gemini").as_deref(),
            Some("gemini-1.5-pro")
        );
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[("PORT", "not-a-port")]));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_model_for_uses_section_without_override() {
        let config = Config::default();
        assert_eq!(
            config.llm.model_for("ollama").as_deref(),
            Some("llama3.2-vision")
        );
        assert!(config.llm.model_for("unknown").is_none());
    }
}
