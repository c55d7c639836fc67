//! Response payloads and the error-to-response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Successful caption response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AltTextResponse {
    pub alt_text: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Stable error kind, e.g. `invalid_image` or `provider_error`
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub model: String,
    /// Whether the provider could be built (API key present)
    pub configured: bool,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Override the status and kind, keeping the message.
    pub fn with_status(mut self, status: StatusCode, kind: &'static str) -> Self {
        self.status = status;
        self.kind = kind;
        self
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind.to_string(),
            details: Some(serde_json::Value::String(self.message.clone())),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self {
            status: StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(kind = self.kind, "{}", self.message);
        } else {
            tracing::debug!(kind = self.kind, "{}", self.message);
        }
        (self.status, Json(self.to_response())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_pipeline_error() {
        let err = ApiError::from(PipelineError::UnsupportedFormat("text/plain".into()));
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.kind(), "unsupported_media_type");
        assert!(err.message().contains("text/plain"));
    }

    #[test]
    fn test_error_response_shape() {
        let err = ApiError::from(PipelineError::EmptyUpload);
        let json = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(json["error"], "empty_upload");
        assert_eq!(json["details"], "Uploaded file is empty");
    }

    #[test]
    fn test_error_response_omits_missing_details() {
        let body = ErrorResponse {
            error: "timeout".into(),
            details: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"timeout"}"#);
    }
}
