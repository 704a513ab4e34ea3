//! The event value and the reasons an event line can be rejected.

use core::fmt;

/// Outcome text recorded for a line whose event was accepted.
pub const SUCCESS_MESSAGE: &str = "Successfully processed";

/// Outcome text recorded for a line that could not be parsed.
pub const MALFORMED_MESSAGE: &str = "Invalid event data format.";

/// Outcome text recorded for a line whose timestamp precedes the window.
pub const TOO_OLD_MESSAGE: &str = "Event timestamp is too old and cannot be processed.";

/// A single accepted observation.
///
/// Events are immutable once validated. The store orders them by
/// [`timestamp`](Self::timestamp) only; `x` and `y` are carried for the
/// aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    timestamp: u64,
    x: f64,
    y: i32,
}

impl Event {
    /// Build an event from already-validated parts.
    pub const fn new(timestamp: u64, x: f64, y: i32) -> Self {
        Self { timestamp, x, y }
    }

    /// Milliseconds since the Unix epoch.
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// The real-valued component, in `[0, 1]`.
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// The integer component.
    pub const fn y(&self) -> i32 {
        self.y
    }
}

/// One broken field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Name of the offending field (`x` or `y`).
    pub field: &'static str,
    /// Human-readable description including the rejected value.
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Why a line did not become an [`Event`].
///
/// These are data outcomes reported back per line, not failures of the
/// batch, so this type deliberately does not implement `std::error::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Wrong number of fields, or a field that does not parse.
    MalformedFormat,
    /// The timestamp falls before the trailing window.
    TooOld,
    /// One or more field bounds were violated, in check order.
    ValidationFailed(Vec<FieldViolation>),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedFormat => f.write_str(MALFORMED_MESSAGE),
            Self::TooOld => f.write_str(TOO_OLD_MESSAGE),
            Self::ValidationFailed(violations) => {
                for (i, violation) in violations.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{violation}")?;
                }
                Ok(())
            }
        }
    }
}
