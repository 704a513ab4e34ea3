//! Wall-clock sources for staleness and eviction decisions.
//!
//! Every logical operation on the aggregator reads "now" exactly once from
//! a [`Clock`] and reuses that reading for all of its window boundaries.
//! Production code uses [`SystemClock`]; tests and replay tooling use
//! [`ManualClock`], which only moves when told to.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// A source of the current time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Return the current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // Clamp pre-epoch readings to zero rather than wrapping.
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Clock whose reading is set explicitly.
///
/// Backed by an atomic so it can be shared between the aggregator and the
/// test driving it without a lock.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at `now_ms`.
    pub const fn new(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    /// Move the clock to an absolute reading.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Move the clock forward by `delta_ms`, saturating at `u64::MAX`.
    pub fn advance(&self, delta_ms: u64) {
        let current = self.now_ms.load(Ordering::SeqCst);
        self.now_ms
            .store(current.saturating_add(delta_ms), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
