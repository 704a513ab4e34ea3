//! Core of the event tracking service: validation, the sliding-window
//! store, and batch ingestion.
//!
//! # Architecture
//!
//! - [`validation`] -- [`Validator`]: raw line to [`Event`] or
//!   [`RejectionReason`].
//! - [`window`] -- [`SlidingWindow`]: timestamp-ordered events with
//!   incrementally maintained [`Aggregate`] totals.
//! - [`batch`] -- splits a payload into lines and records one
//!   [`LineOutcome`] per line.
//! - [`aggregator`] -- [`EventAggregator`]: the `ingest` / `report` facade
//!   holding the window behind a single lock.
//! - [`clock`] and [`config`] -- time source and typed configuration.
//!
//! Everything is in memory; nothing survives a restart.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use eventtrack_core::clock::ManualClock;
//! use eventtrack_core::config::ServiceConfig;
//! use eventtrack_core::EventAggregator;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let now = 1_700_000_000_000_u64;
//! let aggregator = EventAggregator::new(&ServiceConfig::default(), Arc::new(ManualClock::new(now)));
//!
//! let result = aggregator.ingest(&format!("{now},0.5,1500000000\nbogus")).await;
//! assert_eq!(result.accepted(), 1);
//! assert_eq!(result.rejected(), 1);
//!
//! assert_eq!(
//!     aggregator.report().await,
//!     "1,0.5000000000,0.5000000000,1500000000,1500000000.000"
//! );
//! # }
//! ```

pub mod aggregator;
pub mod batch;
pub mod clock;
pub mod config;
pub mod event;
pub mod validation;
pub mod window;

// Re-export primary types at crate root.
pub use aggregator::EventAggregator;
pub use batch::{BatchResult, LineOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ServiceConfig};
pub use event::{Event, FieldViolation, RejectionReason, SUCCESS_MESSAGE};
pub use validation::Validator;
pub use window::{Aggregate, SlidingWindow, EMPTY_REPORT};
