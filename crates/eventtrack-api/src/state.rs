//! Shared application state for the API server.
//!
//! [`AppState`] hands every handler the same [`EventAggregator`]. The
//! aggregator does its own locking, so the state itself needs none.

use std::sync::Arc;

use eventtrack_core::EventAggregator;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The process-wide aggregator that ingests batches and reports stats.
    pub aggregator: Arc<EventAggregator>,
}

impl AppState {
    /// Create application state around an existing aggregator.
    pub const fn new(aggregator: Arc<EventAggregator>) -> Self {
        Self { aggregator }
    }
}
