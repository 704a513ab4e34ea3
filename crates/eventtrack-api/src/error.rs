//! Error types for the API server.
//!
//! [`ApiError`] covers the faults that belong to the HTTP layer rather than
//! to any one event line. Per-line rejections are ordinary response data
//! and never pass through here. The [`IntoResponse`] implementation renders
//! every variant as `{"error": ..., "status": ...}` JSON.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No route matches the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body cannot be read as a payload at all.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::InvalidPayload(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
