//! Route handlers.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::time::Duration;

use super::response::{AltTextResponse, ApiError, HealthResponse};
use super::AppState;
use crate::error::PipelineError;

/// Fields read from the multipart form.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Vec<u8>>,
    word_limit: Option<usize>,
}

/// POST /generate-alt-text - caption an uploaded image
///
/// Multipart fields: `file` (required) and `word_limit` (optional integer).
pub async fn generate_alt_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AltTextResponse>, ApiError> {
    let generator = state.generator()?;

    let multipart = multipart.map_err(|rejection| {
        ApiError::from(PipelineError::InvalidField {
            field: "body".to_string(),
            message: rejection.body_text(),
        })
    })?;
    let form = read_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| PipelineError::MissingField("file".to_string()))?;

    let timeout = Duration::from_millis(state.request_timeout_ms());
    let alt = tokio::time::timeout(timeout, generator.generate(file, form.word_limit))
        .await
        .map_err(|_| PipelineError::Timeout {
            stage: "request".to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })??;

    Ok(Json(AltTextResponse {
        alt_text: alt.alt_text,
    }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        provider: state.provider_name().to_string(),
        model: state.model_name().to_string(),
        configured: state.is_configured(),
    })
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.file = Some(bytes.to_vec());
            }
            Some("word_limit") => {
                let text = field.text().await.map_err(multipart_error)?;
                form.word_limit = parse_word_limit(&text)?;
            }
            Some(other) => tracing::debug!("Ignoring form field '{other}'"),
            None => {}
        }
    }

    Ok(form)
}

/// An empty value means "use the default".
fn parse_word_limit(text: &str) -> Result<Option<usize>, PipelineError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<usize>()
        .map(Some)
        .map_err(|_| PipelineError::InvalidField {
            field: "word_limit".to_string(),
            message: format!("expected a positive integer, got '{text}'"),
        })
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::from(PipelineError::InvalidField {
            field: "file".to_string(),
            message: err.body_text(),
        })
        .with_status(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large");
    }
    ApiError::from(PipelineError::InvalidField {
        field: "body".to_string(),
        message: err.body_text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_limit() {
        assert_eq!(parse_word_limit("").unwrap(), None);
        assert_eq!(parse_word_limit(" 12 ").unwrap(), Some(12));
        assert!(parse_word_limit("twelve").is_err());
        assert!(parse_word_limit("-3").is_err());
    }
}
