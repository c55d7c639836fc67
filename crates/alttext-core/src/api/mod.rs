//! HTTP API: the upload endpoint and health check.
//!
//! Routes:
//! - `POST /generate-alt-text` (also `POST /v1/alt-text`): multipart `file` + optional `word_limit`
//! - `GET /health`

pub mod handler;
pub mod response;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::caption::AltTextGenerator;
use crate::config::Config;
use crate::error::{PipelineError, Result};

pub use response::{AltTextResponse, ApiError, ErrorResponse, HealthResponse};

/// Room for multipart boundaries and the `word_limit` field on top of the file limit.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// State shared by all handlers.
///
/// Holds the generator when the provider could be built. Otherwise it keeps
/// the configuration error so every request can report it.
#[derive(Clone)]
pub struct AppState {
    generator: std::result::Result<Arc<AltTextGenerator>, ApiError>,
    provider: String,
    model: String,
    request_timeout_ms: u64,
}

impl AppState {
    /// State backed by a ready generator.
    pub fn new(generator: AltTextGenerator, config: &Config) -> Self {
        Self {
            provider: generator.provider().name().to_string(),
            model: generator.provider().model().to_string(),
            generator: Ok(Arc::new(generator)),
            request_timeout_ms: config.server.request_timeout_ms,
        }
    }

    /// Build the provider from config; a missing key leaves the state unconfigured.
    pub fn from_config(
        config: &Config,
        provider_override: Option<&str>,
        model_override: Option<&str>,
    ) -> Self {
        match AltTextGenerator::from_config(config, provider_override, model_override) {
            Ok(generator) => Self::new(generator, config),
            Err(e) => {
                tracing::warn!("Provider not configured: {e}");
                let provider = provider_override.unwrap_or(&config.llm.provider).to_string();
                let model = model_override
                    .map(str::to_string)
                    .or_else(|| config.llm.model_for(&provider))
                    .unwrap_or_default();
                Self::unconfigured(provider, model, e, config)
            }
        }
    }

    /// State that answers every caption request with `error`.
    pub fn unconfigured(
        provider: String,
        model: String,
        error: PipelineError,
        config: &Config,
    ) -> Self {
        Self {
            generator: Err(ApiError::from(error)),
            provider,
            model,
            request_timeout_ms: config.server.request_timeout_ms,
        }
    }

    pub fn generator(&self) -> std::result::Result<&Arc<AltTextGenerator>, ApiError> {
        self.generator.as_ref().map_err(Clone::clone)
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_ok()
    }

    pub fn provider_name(&self) -> &str {
        &self.provider
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn request_timeout_ms(&self) -> u64 {
        self.request_timeout_ms
    }
}

/// Build the router with CORS, request tracing, and the upload body limit.
pub fn router(state: AppState, config: &Config) -> Router {
    let body_limit = config
        .limits
        .max_file_size_bytes()
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route("/generate-alt-text", post(handler::generate_alt_text))
        .route("/v1/alt-text", post(handler::generate_alt_text))
        .route("/health", get(handler::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&config.server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{o}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState, config: &Config) -> Result<()> {
    let app = router(state, config);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
