//! The `alttext serve` command.

use alttext_core::{AppState, Config};
use anyhow::Context;
use clap::Args;

use super::Provider;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (defaults to `server.host`, or $HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (defaults to `server.port`, or $PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Vision provider (defaults to `llm.provider`)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (provider-specific)
    #[arg(long)]
    pub model: Option<String>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr = tokio::net::lookup_host((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("Invalid bind address {}", config.server.host))?
        .next()
        .with_context(|| format!("No address found for {}", config.server.host))?;

    let provider = args.provider.map(|p| p.as_str());
    let state = AppState::from_config(&config, provider, args.model.as_deref());
    tracing::info!(
        provider = state.provider_name(),
        model = state.model_name(),
        configured = state.is_configured(),
        "Starting alt-text service"
    );

    alttext_core::serve(addr, state, &config).await?;
    Ok(())
}
