//! Error types for apphub-rec
//!
//! Two layers: `RecError` is the recommendation pipeline's terminal
//! error taxonomy (only the chat call and the response parse can kill a
//! request; catalog failures degrade to fallback data and never appear
//! here). `ApiError` is the HTTP-facing wrapper.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Terminal errors from the recommendation pipeline
#[derive(Debug, Error)]
pub enum RecError {
    /// Required chat provider key is absent; nothing can be produced
    #[error("Chat provider not configured: {0}")]
    Config(String),

    /// Chat provider transport failure, non-2xx response, or empty completion
    #[error("Chat provider error: {0}")]
    Service(String),

    /// Model output did not contain a parseable JSON array
    #[error("Could not parse model response: {message}")]
    Parse {
        message: String,
        /// Truncated raw text, for logs only; never shown to end users
        snippet: String,
    },
}

impl RecError {
    /// Build a parse error carrying the first 200 chars of the raw text
    pub fn parse(message: impl Into<String>, raw: &str) -> Self {
        RecError::Parse {
            message: message.into(),
            snippet: raw.chars().take(200).collect(),
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream provider failure (502)
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<RecError> for ApiError {
    fn from(err: RecError) -> Self {
        match &err {
            RecError::Parse { snippet, .. } => {
                tracing::error!(snippet = %snippet, "Recommendation parse failure");
            }
            other => {
                tracing::error!(error = %other, "Recommendation pipeline failure");
            }
        }
        ApiError::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
