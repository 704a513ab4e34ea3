//! HTTP API for the event tracking service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`POST /event`** -- ingest a newline-separated batch and receive one
//!   outcome message per line, keyed by line number
//! - **`GET /stats`** -- `count,sumX,avgX,sumY,avgY` over the trailing
//!   window as plain text
//!
//! # Architecture
//!
//! Handlers share one [`EventAggregator`] through [`AppState`]. All
//! window locking lives inside the aggregator; the HTTP layer only
//! translates batch results into status codes and JSON.
//!
//! [`EventAggregator`]: eventtrack_core::EventAggregator

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
