//! Domain-specific error types for keigo-sensei

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Main error type for the keigo tutoring service.
///
/// `External` and `Parse` are normally absorbed by the heuristic/static
/// fallbacks and never reach a caller on the scoring paths; the remaining
/// variants surface as HTTP error responses.
#[derive(Error, Debug)]
pub enum KeigoError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("External service error: {message}")]
    External { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for KeigoError {
    fn from(err: anyhow::Error) -> Self {
        KeigoError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for KeigoError {
    fn from(err: serde_json::Error) -> Self {
        KeigoError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for KeigoError {
    fn from(err: reqwest::Error) -> Self {
        KeigoError::External {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Convert KeigoError to an HTTP error response
impl IntoResponse for KeigoError {
    fn into_response(self) -> Response {
        let status = match &self {
            KeigoError::Validation { .. } => StatusCode::BAD_REQUEST,
            KeigoError::Config { .. }
            | KeigoError::External { .. }
            | KeigoError::Parse { .. }
            | KeigoError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            axum::Json(json!({
                "error": { "code": status.as_u16(), "message": self.to_string() }
            })),
        )
            .into_response()
    }
}

/// Result type alias for keigo-sensei operations
pub type Result<T> = std::result::Result<T, KeigoError>;
