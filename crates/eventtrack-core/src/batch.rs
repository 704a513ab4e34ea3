//! Batch ingestion: one payload in, one outcome per line out.
//!
//! Lines are handled strictly in payload order and independently of each
//! other. A rejected line never stops the lines after it, and every line,
//! empty or not, gets exactly one entry keyed by its 1-based position.

use core::fmt;
use std::collections::BTreeMap;

use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::event::{RejectionReason, SUCCESS_MESSAGE};
use crate::validation::Validator;
use crate::window::SlidingWindow;

/// What happened to one payload line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The event was validated and added to the window.
    Processed,
    /// The line was rejected; nothing was added.
    Rejected(RejectionReason),
}

impl LineOutcome {
    /// Whether the line's event made it into the window.
    pub const fn is_processed(&self) -> bool {
        matches!(self, Self::Processed)
    }
}

impl fmt::Display for LineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processed => f.write_str(SUCCESS_MESSAGE),
            Self::Rejected(reason) => write!(f, "{reason}"),
        }
    }
}

/// Per-line outcomes of one payload, keyed by 1-based line number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    outcomes: BTreeMap<usize, LineOutcome>,
}

impl BatchResult {
    /// Outcomes in line order.
    pub const fn outcomes(&self) -> &BTreeMap<usize, LineOutcome> {
        &self.outcomes
    }

    /// Outcome of the given 1-based line.
    pub fn get(&self, line: usize) -> Option<&LineOutcome> {
        self.outcomes.get(&line)
    }

    /// Number of lines in the payload.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the payload had no lines at all.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of lines whose event was added to the window.
    pub fn accepted(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_processed()).count()
    }

    /// Number of rejected lines.
    pub fn rejected(&self) -> usize {
        self.len().saturating_sub(self.accepted())
    }

    /// Render every outcome as its message text.
    pub fn messages(&self) -> BTreeMap<usize, String> {
        self.outcomes
            .iter()
            .map(|(line, outcome)| (*line, outcome.to_string()))
            .collect()
    }
}

/// Split a payload into lines on `\n`.
///
/// Trailing empty lines are dropped, so `"a\n\n"` is one line and `"\n"`
/// is none. Interior empty lines are kept, and an empty payload is one
/// empty line.
pub fn split_lines(payload: &str) -> impl Iterator<Item = &str> {
    let body = payload.trim_end_matches('\n');
    let only_newlines = body.is_empty() && !payload.is_empty();
    (!only_newlines)
        .then(|| body.split('\n'))
        .into_iter()
        .flatten()
}

/// Validate every line of `payload` against `now_ms` and insert the accepted
/// events into `window`.
///
/// The window lock is taken once per accepted event, for an eviction pass
/// followed by the insert, and is never held while validating.
pub async fn process(
    payload: &str,
    now_ms: u64,
    validator: &Validator,
    window: &Mutex<SlidingWindow>,
) -> BatchResult {
    let batch_id = Uuid::now_v7();
    let mut result = BatchResult::default();

    for (index, line) in split_lines(payload).enumerate() {
        let line_number = index.saturating_add(1);

        let outcome = match validator.validate(line, now_ms) {
            Ok(event) => {
                let mut guard = window.lock().await;
                let evicted = guard.evict_expired(now_ms);
                guard.insert(event);
                drop(guard);
                if evicted > 0 {
                    debug!(%batch_id, evicted, "evicted expired events before insert");
                }
                LineOutcome::Processed
            }
            Err(reason) => {
                debug!(%batch_id, line = line_number, reason = %reason, "rejected event line");
                LineOutcome::Rejected(reason)
            }
        };

        result.outcomes.insert(line_number, outcome);
    }

    info!(
        %batch_id,
        lines = result.len(),
        accepted = result.accepted(),
        rejected = result.rejected(),
        "batch ingested"
    );

    result
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;

    const NOW: u64 = 1_700_000_000_000;
    const WINDOW: u64 = 60_000;

    fn validator() -> Validator {
        Validator::new(WINDOW, ValidationConfig::default())
    }

    #[test]
    fn split_keeps_interior_empty_lines() {
        let lines: Vec<&str> = split_lines("a\n\nb").collect();
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn split_drops_trailing_empty_lines() {
        let lines: Vec<&str> = split_lines("a\nb\n").collect();
        assert_eq!(lines, vec!["a", "b"]);

        let lines: Vec<&str> = split_lines("a\n\n").collect();
        assert_eq!(lines, vec!["a"]);

        let lines: Vec<&str> = split_lines("a\n\nb\n\n\n").collect();
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn split_newlines_only_payload_has_no_lines() {
        assert_eq!(split_lines("\n").count(), 0);
        assert_eq!(split_lines("\n\n\n").count(), 0);
    }

    #[test]
    fn split_keeps_whitespace_only_trailing_line() {
        let lines: Vec<&str> = split_lines("a\n \n").collect();
        assert_eq!(lines, vec!["a", " "]);
    }

    #[test]
    fn split_empty_payload_is_one_line() {
        let lines: Vec<&str> = split_lines("").collect();
        assert_eq!(lines, vec![""]);
    }

    #[tokio::test]
    async fn one_outcome_per_line_in_order() {
        let window = Mutex::new(SlidingWindow::new(WINDOW));
        let payload = format!(
            "invalid data\n{ts},0.0302456915,1112127673\n\n{old},0.5,1282509067\n{ts},12.5,50",
            ts = NOW - 4_000,
            old = NOW - 120_000,
        );

        let result = process(&payload, NOW, &validator(), &window).await;

        assert_eq!(result.len(), 5);
        let keys: Vec<usize> = result.outcomes().keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5]);

        let messages = result.messages();
        assert_eq!(messages[&1], "Invalid event data format.");
        assert_eq!(messages[&2], "Successfully processed");
        assert_eq!(messages[&3], "Invalid event data format.");
        assert_eq!(
            messages[&4],
            "Event timestamp is too old and cannot be processed."
        );
        assert_eq!(
            messages[&5],
            "x: Value 12.5 is invalid: x must be between 0 and 1.; \
             y: Value 50 is invalid: y must be greater than or equal to 1073741823."
        );

        assert_eq!(result.accepted(), 1);
        assert_eq!(result.rejected(), 4);
        assert_eq!(window.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn trailing_blank_lines_add_no_outcomes() {
        let window = Mutex::new(SlidingWindow::new(WINDOW));
        let payload = format!("{NOW},0.5,1282509067\n\n");

        let result = process(&payload, NOW, &validator(), &window).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(1), Some(&LineOutcome::Processed));
        assert_eq!(result.rejected(), 0);
    }

    #[tokio::test]
    async fn newline_only_payload_is_an_empty_batch() {
        let window = Mutex::new(SlidingWindow::new(WINDOW));

        let result = process("\n", NOW, &validator(), &window).await;

        assert!(result.is_empty());
        assert!(window.lock().await.is_empty());
    }

    #[tokio::test]
    async fn stale_line_leaves_window_untouched() {
        let window = Mutex::new(SlidingWindow::new(WINDOW));
        let payload = format!("{},0.0231608748,1282509067", NOW - 120_000);

        let result = process(&payload, NOW, &validator(), &window).await;

        assert_eq!(
            result.get(1),
            Some(&LineOutcome::Rejected(RejectionReason::TooOld))
        );
        assert!(window.lock().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_then_valid_with_early_clock() {
        let window = Mutex::new(SlidingWindow::new(WINDOW));

        let result = process("abc\n100,0.5,2000000000", 1_000, &validator(), &window).await;

        assert_eq!(
            result.get(1),
            Some(&LineOutcome::Rejected(RejectionReason::MalformedFormat))
        );
        assert_eq!(result.get(2), Some(&LineOutcome::Processed));
    }

    #[tokio::test]
    async fn insert_evicts_expired_events_first() {
        let window = Mutex::new(SlidingWindow::new(WINDOW));
        let v = validator();

        let first = format!("{NOW},0.5,1282509067");
        let _ = process(&first, NOW, &v, &window).await;

        let later = NOW + WINDOW + 1;
        let second = format!("{later},0.25,1282509067");
        let _ = process(&second, later, &v, &window).await;

        let guard = window.lock().await;
        assert_eq!(guard.len(), 1);
        assert_eq!(guard.oldest_timestamp(), Some(later));
    }
}
