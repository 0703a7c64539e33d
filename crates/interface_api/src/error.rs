//! API error handling
//!
//! Error bodies follow the feed contract: the `error` field carries the
//! caller-facing text, `message` only appears on internal errors, and no
//! internal detail ever leaks through either.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_recon::ReconError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests".to_string(),
                None,
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
                Some(msg),
            ),
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

impl From<ReconError> for ApiError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Validation(msg) => ApiError::BadRequest(msg),
            ReconError::NotFound(msg) => ApiError::NotFound(msg),
            ReconError::Conflict(msg) => ApiError::Conflict(msg),
            // Storage detail goes to the log, not the wire.
            ReconError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage failure surfaced to API boundary");
                ApiError::Internal("A storage error occurred".to_string())
            }
        }
    }
}
