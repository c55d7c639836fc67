//! The `alttext config` command for configuration management.

use anyhow::Context;
use clap::{Args, Subcommand};
use console::Style;
use dialoguer::Password;
use std::path::Path;

use alttext_core::llm::provider::{env_var_for, provider_label};
use alttext_core::Config;

use super::Provider;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store an API key for a provider (prompts when KEY is omitted)
    SetKey {
        #[arg(value_enum)]
        provider: Provider,

        /// API key; read from a hidden prompt if omitted
        key: Option<String>,
    },

    /// Make a provider the default, optionally pinning its model
    Use {
        #[arg(value_enum)]
        provider: Provider,

        /// Model to use with this provider
        #[arg(long)]
        model: Option<String>,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs, config: Config) -> anyhow::Result<()> {
    let path = Config::default_path();

    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }
            write_config(&path, &Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::SetKey { provider, key } => {
            if provider == Provider::Ollama {
                anyhow::bail!("Ollama runs locally and does not use an API key.");
            }
            let key = match key {
                Some(key) => key,
                None => prompt_key(provider)?,
            };
            if key.trim().is_empty() {
                anyhow::bail!("API key is empty; nothing saved.");
            }

            let updated = set_value(
                &read_or_empty(&path)?,
                &["llm", provider.as_str()],
                "api_key",
                key.trim(),
            )?;
            save_checked(&path, &updated)?;

            let dim = Style::new().for_stderr().dim();
            eprintln!(
                "{}",
                dim.apply_to(format!(
                    "{} key saved to {}",
                    provider_label(provider.as_str()),
                    path.display()
                ))
            );
        }

        ConfigCommand::Use { provider, model } => {
            let mut content =
                set_value(&read_or_empty(&path)?, &["llm"], "provider", provider.as_str())?;
            if let Some(model) = &model {
                content = set_value(&content, &["llm", provider.as_str()], "model", model)?;
            }
            save_checked(&path, &content)?;

            println!(
                "Default provider set to {}{}",
                provider,
                model.map(|m| format!(" ({m})")).unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn prompt_key(provider: Provider) -> anyhow::Result<String> {
    let warn = Style::new().for_stderr().yellow();
    eprintln!(
        "  {}",
        warn.apply_to(format!(
            "Keys stored in the config file are plain text. ${} works too.",
            env_var_for(provider.as_str())
        ))
    );

    let key = Password::new()
        .with_prompt(format!("Enter your {} API key", provider_label(provider.as_str())))
        .allow_empty_password(true)
        .interact()?;
    Ok(key)
}

fn read_or_empty(path: &Path) -> anyhow::Result<String> {
    if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    } else {
        Ok(String::new())
    }
}

/// Set `key = value` under the table at `table_path`, preserving comments and
/// layout elsewhere in the document.
fn set_value(content: &str, table_path: &[&str], key: &str, value: &str) -> anyhow::Result<String> {
    let mut doc: toml_edit::DocumentMut = content
        .parse()
        .context("Existing config file is not valid TOML")?;

    let mut table = doc.as_table_mut();
    for name in table_path {
        if !table.get(name).is_some_and(|item| item.is_table_like()) {
            table.insert(name, toml_edit::Item::Table(toml_edit::Table::new()));
        }
        table = table
            .get_mut(name)
            .and_then(|item| item.as_table_mut())
            .with_context(|| format!("[{name}] must be a standard table"))?;
    }
    table.insert(key, toml_edit::value(value));

    Ok(doc.to_string())
}

/// Write `content` only if it still parses as a valid config.
fn save_checked(path: &Path, content: &str) -> anyhow::Result<()> {
    let parsed: Config = toml::from_str(content).context("Updated config does not parse")?;
    parsed.validate()?;
    write_config(path, content)
}

fn write_config(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_creates_tables() {
        let out = set_value("", &["llm", "anthropic"], "api_key", "sk-ant-123").unwrap();
        let config: Config = toml::from_str(&out).unwrap();
        assert_eq!(config.llm.anthropic.api_key, "sk-ant-123");
    }

    #[test]
    fn test_set_value_preserves_comments() {
        let original = "# my settings\n[server]\nport = 9000 # custom port\n";
        let out = set_value(original, &["llm"], "provider", "gemini").unwrap();
        assert!(out.contains("# my settings"));
        assert!(out.contains("# custom port"));

        let config: Config = toml::from_str(&out).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_set_value_replaces_existing_key() {
        let original = "[llm.openai]\napi_key = \"old\"\nmodel = \"gpt-4o\"\n";
        let out = set_value(original, &["llm", "openai"], "api_key", "new").unwrap();
        let config: Config = toml::from_str(&out).unwrap();
        assert_eq!(config.llm.openai.api_key, "new");
        assert_eq!(config.llm.openai.model, "gpt-4o");
    }

    #[test]
    fn test_set_value_rejects_invalid_toml() {
        assert!(set_value("[llm", &["llm"], "provider", "openai").is_err());
    }

    #[test]
    fn test_save_checked_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let content = set_value("", &["llm"], "provider", "nonexistent").unwrap();

        assert!(save_checked(&path, &content).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_save_checked_writes_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let content = set_value("", &["llm"], "provider", "ollama").unwrap();

        save_checked(&path, &content).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.llm.provider, "ollama");
    }
}
