//! REST endpoint handlers for the API server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/event` | Ingest a newline-separated batch of events |
//! | `GET` | `/stats` | Rolling statistics over the trailing window |

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use eventtrack_core::BatchResult;

use crate::error::ApiError;
use crate::state::AppState;

/// How a batch fared as a whole, which decides the response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every line was processed (also used for a batch with no lines).
    Accepted,
    /// Every line was rejected.
    Rejected,
    /// Some lines were processed and some rejected.
    Mixed,
}

impl BatchStatus {
    /// Classify a batch result.
    pub fn of(result: &BatchResult) -> Self {
        match (result.accepted(), result.rejected()) {
            (_, 0) => Self::Accepted,
            (0, _) => Self::Rejected,
            _ => Self::Mixed,
        }
    }

    /// The HTTP status reported for this classification.
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Accepted => StatusCode::ACCEPTED,
            Self::Rejected => StatusCode::BAD_REQUEST,
            Self::Mixed => StatusCode::MULTI_STATUS,
        }
    }
}

// ---------------------------------------------------------------------------
// POST /event -- ingest a batch
// ---------------------------------------------------------------------------

/// Ingest the request body as a batch and return one message per line.
///
/// The response body is a JSON object keyed by 1-based line number. The
/// status is `202` when every line was processed, `400` when none were,
/// and `207` when the batch was mixed.
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = std::str::from_utf8(&body)
        .map_err(|e| ApiError::InvalidPayload(format!("payload is not valid UTF-8: {e}")))?;

    let result = state.aggregator.ingest(payload).await;
    let status = BatchStatus::of(&result).status_code();

    Ok((status, Json(result.messages())))
}

// ---------------------------------------------------------------------------
// GET /stats -- rolling statistics
// ---------------------------------------------------------------------------

/// Return `count,sumX,avgX,sumY,avgY` for the trailing window as plain text.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.aggregator.report().await
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Reply to any unrouted request with a JSON 404.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No handler found for {method} {}", uri.path()))
}
