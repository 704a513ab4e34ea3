//! The sliding-window store: accepted events ordered by timestamp plus the
//! running totals over them.
//!
//! # Design
//!
//! - **Ordered**: events sit in a [`VecDeque`] ascending by timestamp, with
//!   equal timestamps in arrival order. Eviction pops from the front;
//!   insertion scans back from the tail, which is O(1) for the usual
//!   nearly-in-order arrivals.
//! - **Incremental**: [`Aggregate`] is updated on every insert and eviction,
//!   so [`SlidingWindow::snapshot`] never walks the sequence.
//! - **Not synchronised**: the sequence and totals must change together, so
//!   callers hold the whole [`SlidingWindow`] behind one lock (see
//!   [`EventAggregator`](crate::EventAggregator)).

use core::fmt;
use std::collections::VecDeque;

use crate::event::Event;

/// Report line for a window that holds no events.
pub const EMPTY_REPORT: &str = "0,0.0000000000,0.0000000000,0,0.000";

/// Running totals over the events currently in the window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregate {
    /// Number of events.
    pub count: u64,
    /// Sum of `x` over all events.
    pub sum_x: f64,
    /// Exact sum of `y` over all events.
    pub sum_y: i64,
}

impl Aggregate {
    /// Mean of `x`, or `None` for an empty window.
    #[allow(clippy::cast_precision_loss)]
    pub fn average_x(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_x / self.count as f64)
    }

    /// Mean of `y`, or `None` for an empty window.
    #[allow(clippy::cast_precision_loss)]
    pub fn average_y(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_y as f64 / self.count as f64)
    }

    fn add(&mut self, event: &Event) {
        self.count = self.count.saturating_add(1);
        self.sum_x += event.x();
        self.sum_y = self.sum_y.saturating_add(i64::from(event.y()));
    }

    fn subtract(&mut self, event: &Event) {
        self.count = self.count.saturating_sub(1);
        if self.count == 0 {
            // Drop any floating-point residue once the window drains.
            self.sum_x = 0.0;
            self.sum_y = 0;
        } else {
            self.sum_x -= event.x();
            self.sum_y = self.sum_y.saturating_sub(i64::from(event.y()));
        }
    }
}

/// Formats as `count,sumX,avgX,sumY,avgY` with 10, 10, and 3 decimal
/// places on the real-valued fields, or [`EMPTY_REPORT`] when empty.
impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.average_x(), self.average_y()) {
            (Some(avg_x), Some(avg_y)) => write!(
                f,
                "{},{:.10},{:.10},{},{:.3}",
                self.count, self.sum_x, avg_x, self.sum_y, avg_y
            ),
            _ => f.write_str(EMPTY_REPORT),
        }
    }
}

/// Accepted events within the trailing window and their totals.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    window_ms: u64,
    events: VecDeque<Event>,
    totals: Aggregate,
}

impl SlidingWindow {
    /// Create an empty window covering the trailing `window_ms` milliseconds.
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            events: VecDeque::new(),
            totals: Aggregate {
                count: 0,
                sum_x: 0.0,
                sum_y: 0,
            },
        }
    }

    /// The trailing window length in milliseconds.
    pub const fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Number of events held.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the window holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the oldest held event.
    pub fn oldest_timestamp(&self) -> Option<u64> {
        self.events.front().map(Event::timestamp)
    }

    /// Iterate over held events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Insert an event after every held event with a timestamp not greater
    /// than its own, and fold it into the totals.
    pub fn insert(&mut self, event: Event) {
        let position = self
            .events
            .iter()
            .rposition(|held| held.timestamp() <= event.timestamp())
            .map_or(0, |index| index.saturating_add(1));

        self.totals.add(&event);
        self.events.insert(position, event);
    }

    /// Remove events older than `now_ms - window_ms` from the front and
    /// subtract them from the totals. Returns the number removed.
    pub fn evict_expired(&mut self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        let mut evicted = 0_usize;

        while self
            .events
            .front()
            .is_some_and(|oldest| oldest.timestamp() < cutoff)
        {
            if let Some(expired) = self.events.pop_front() {
                self.totals.subtract(&expired);
                evicted = evicted.saturating_add(1);
            }
        }

        evicted
    }

    /// Current totals, without scanning the held events.
    pub const fn snapshot(&self) -> Aggregate {
        self.totals
    }
}
