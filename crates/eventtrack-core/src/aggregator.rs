//! The aggregator facade: the two operations the transport layer calls.
//!
//! [`EventAggregator`] owns the clock, the validator, and the single lock
//! around the [`SlidingWindow`]. Each call reads the clock once and uses
//! that reading for every staleness and eviction decision it makes.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::batch::{self, BatchResult};
use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::validation::Validator;
use crate::window::{Aggregate, SlidingWindow};

/// Shared, thread-safe event aggregator.
///
/// Cheap to share behind an [`Arc`]; all methods take `&self`.
pub struct EventAggregator {
    clock: Arc<dyn Clock>,
    validator: Validator,
    window: Mutex<SlidingWindow>,
}

impl EventAggregator {
    /// Build an aggregator from configuration, reading time from `clock`.
    pub fn new(config: &ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let window_ms = config.window.duration_ms;
        Self {
            clock,
            validator: Validator::new(window_ms, config.validation),
            window: Mutex::new(SlidingWindow::new(window_ms)),
        }
    }

    /// Build an aggregator that reads the system wall clock.
    pub fn with_system_clock(config: &ServiceConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    /// The trailing window length in milliseconds.
    pub const fn window_ms(&self) -> u64 {
        self.validator.window_ms()
    }

    /// Validate and ingest every line of `payload`.
    pub async fn ingest(&self, payload: &str) -> BatchResult {
        let now_ms = self.clock.now_millis();
        batch::process(payload, now_ms, &self.validator, &self.window).await
    }

    /// Evict expired events and return the current totals.
    pub async fn snapshot(&self) -> Aggregate {
        let now_ms = self.clock.now_millis();
        let mut window = self.window.lock().await;
        let evicted = window.evict_expired(now_ms);
        let totals = window.snapshot();
        drop(window);

        if evicted > 0 {
            debug!(evicted, remaining = totals.count, "evicted expired events");
        }
        totals
    }

    /// The statistics line `count,sumX,avgX,sumY,avgY` for the current
    /// window.
    pub async fn report(&self) -> String {
        self.snapshot().await.to_string()
    }
}

impl core::fmt::Debug for EventAggregator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventAggregator")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ValidationConfig;
    use crate::window::EMPTY_REPORT;

    const NOW: u64 = 1_700_000_000_000;

    fn aggregator_at(now: u64) -> (EventAggregator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let aggregator = EventAggregator::new(&ServiceConfig::default(), clock.clone());
        (aggregator, clock)
    }

    #[tokio::test]
    async fn empty_report_is_the_zero_literal() {
        let (aggregator, _) = aggregator_at(NOW);
        assert_eq!(aggregator.report().await, EMPTY_REPORT);
    }

    #[tokio::test]
    async fn ingest_then_report() {
        let (aggregator, _) = aggregator_at(NOW);
        let ts = NOW - 3_000;
        let payload = format!("{ts},0.0899538547,1282509067\n{ts},0.0876221433,1194727708");

        let result = aggregator.ingest(&payload).await;
        assert_eq!(result.accepted(), 2);

        assert_eq!(
            aggregator.report().await,
            "2,0.1775759980,0.0887879990,2477236775,1238618387.500"
        );
    }

    #[tokio::test]
    async fn report_is_idempotent_without_ingest() {
        let (aggregator, _) = aggregator_at(NOW);
        let _ = aggregator
            .ingest(&format!("{NOW},0.3,1282509067"))
            .await;

        let first = aggregator.report().await;
        let second = aggregator.report().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn only_event_expires_after_the_window() {
        let (aggregator, clock) = aggregator_at(NOW);
        let _ = aggregator
            .ingest(&format!("{NOW},0.0360791311,1282509067"))
            .await;
        assert!(aggregator.report().await.starts_with("1,"));

        clock.advance(aggregator.window_ms() + 1);
        assert_eq!(aggregator.report().await, EMPTY_REPORT);
    }

    #[tokio::test]
    async fn stale_event_does_not_touch_aggregate() {
        let (aggregator, _) = aggregator_at(NOW);
        let result = aggregator
            .ingest(&format!("{},0.0231608748,1282509067", NOW - 120_000))
            .await;

        assert_eq!(
            result.messages().get(&1).map(String::as_str),
            Some("Event timestamp is too old and cannot be processed.")
        );
        assert_eq!(aggregator.report().await, EMPTY_REPORT);
    }

    #[tokio::test]
    async fn relaxed_bounds_aggregate_small_values() {
        let config = ServiceConfig {
            validation: ValidationConfig {
                y_min: 0,
                y_max: 1_000,
                x_max_fraction_digits: 10,
            },
            ..ServiceConfig::default()
        };
        let aggregator = EventAggregator::new(&config, Arc::new(ManualClock::new(NOW)));

        let result = aggregator
            .ingest(&format!("{NOW},0.5,100\n{NOW},0.25,200"))
            .await;
        assert_eq!(result.accepted(), 2);
        assert_eq!(
            aggregator.report().await,
            "2,0.7500000000,0.3750000000,300,150.000"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ingest_and_report_lose_nothing() {
        let (aggregator, _) = aggregator_at(NOW);
        let aggregator = Arc::new(aggregator);

        let mut handles = Vec::new();
        for task in 0..8_u64 {
            let aggregator = Arc::clone(&aggregator);
            handles.push(tokio::spawn(async move {
                let payload: Vec<String> = (0..25_u64)
                    .map(|i| format!("{},0.5,1073741823", NOW - task * 100 - i))
                    .collect();
                let result = aggregator.ingest(&payload.join("\n")).await;
                let _ = aggregator.report().await;
                result.accepted()
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            accepted += handle.await.unwrap();
        }

        assert_eq!(accepted, 200);
        let totals = aggregator.snapshot().await;
        assert_eq!(totals.count, 200);
        assert_eq!(totals.sum_y, 200 * 1_073_741_823);
        assert_eq!(format!("{:.10}", totals.sum_x), "100.0000000000");
    }
}
