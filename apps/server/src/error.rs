//! API error type shared by all handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type alias for handler functions.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors surfaced to HTTP clients.
///
/// Gateway and store failures are deliberately absent: handlers recover from
/// those locally with mock substitution and never turn them into error
/// statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed client request (missing or empty fields).
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected server-side failure.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
