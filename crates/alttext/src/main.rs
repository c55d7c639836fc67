//! alttext CLI - HTTP service and command-line tool that turns images into alt text.
//!
//! Images are sent to a hosted vision-language model (OpenAI, Anthropic,
//! Gemini, Hyperbolic, Hugging Face) or a local Ollama instance, and the
//! returned caption is cut to a word limit.
//!
//! # Usage
//!
//! ```bash
//! # Run the upload endpoint on $PORT (default 8000)
//! alttext serve
//!
//! # Describe a single image or a whole directory
//! alttext describe photo.jpg --word-limit 15
//! alttext describe ./photos/ --format jsonl --output alt.jsonl
//!
//! # Store an API key and pick a provider
//! alttext config set-key anthropic
//! alttext config use anthropic
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// alttext - accessible alt text for images from vision-language models.
#[derive(Parser, Debug)]
#[command(name = "alttext")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP upload endpoint
    Serve(cli::serve::ServeArgs),

    /// Generate alt text for image files
    Describe(cli::describe::DescribeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match alttext_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `alttext config path`."
            );
            let mut config = alttext_core::Config::default();
            config.apply_env_overrides(|key| std::env::var(key).ok());
            match config.validate() {
                Ok(()) => config,
                Err(e) => {
                    eprintln!("Warning: Ignoring environment overrides: {e}");
                    alttext_core::Config::default()
                }
            }
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("alttext v{}", alttext_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Describe(args) => cli::describe::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config).await,
    }
}
