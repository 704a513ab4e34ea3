//! Line parsing and field validation.
//!
//! [`Validator::validate`] turns one raw payload line into an [`Event`] or a
//! [`RejectionReason`]. The stages run in a fixed order:
//!
//! 1. Format -- exactly three comma-separated fields that parse as
//!    `u64`, `f64`, and `i32`.
//! 2. Staleness -- the timestamp must not precede the trailing window.
//! 3. Field bounds -- every field rule runs and all
//!    violations are collected.
//!
//! A stale line reports staleness even when its fields are also out of
//! bounds. Validation is pure: "now" is supplied by the caller.

use crate::config::ValidationConfig;
use crate::event::{Event, FieldViolation, RejectionReason};

/// A field rule: returns a violation when the event breaks it.
type FieldCheck = fn(&ValidationConfig, &Event) -> Option<FieldViolation>;

/// Field rules in reporting order.
const FIELD_CHECKS: [FieldCheck; 4] = [check_x_range, check_x_precision, check_y_min, check_y_max];

/// Validates raw event lines against the window and the configured bounds.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    window_ms: u64,
    bounds: ValidationConfig,
}

impl Validator {
    /// Create a validator for a trailing window of `window_ms` milliseconds.
    pub const fn new(window_ms: u64, bounds: ValidationConfig) -> Self {
        Self { window_ms, bounds }
    }

    /// The trailing window length in milliseconds.
    pub const fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Parse and validate one line against the reading `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`RejectionReason::MalformedFormat`] if the line does not
    /// parse, [`RejectionReason::TooOld`] if it predates the window, or
    /// [`RejectionReason::ValidationFailed`] with every broken field rule.
    pub fn validate(&self, line: &str, now_ms: u64) -> Result<Event, RejectionReason> {
        let event = parse_line(line).ok_or(RejectionReason::MalformedFormat)?;

        if event.timestamp() < now_ms.saturating_sub(self.window_ms) {
            return Err(RejectionReason::TooOld);
        }

        let violations: Vec<FieldViolation> = FIELD_CHECKS
            .iter()
            .filter_map(|check| check(&self.bounds, &event))
            .collect();

        if violations.is_empty() {
            Ok(event)
        } else {
            Err(RejectionReason::ValidationFailed(violations))
        }
    }
}

/// Split a line into `timestamp,x,y` and parse each field.
///
/// Trailing empty fields are dropped, so `ts,x,y,` still has three fields.
fn parse_line(line: &str) -> Option<Event> {
    let mut fields = line.trim().trim_end_matches(',').split(',');
    let (Some(timestamp), Some(x), Some(y), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return None;
    };

    let timestamp = timestamp.trim().parse::<u64>().ok()?;
    let x = x.trim().parse::<f64>().ok()?;
    let y = y.trim().parse::<i32>().ok()?;

    Some(Event::new(timestamp, x, y))
}

fn violation(field: &'static str, value: impl core::fmt::Display, rule: &str) -> FieldViolation {
    FieldViolation {
        field,
        message: format!("Value {value} is invalid: {rule}"),
    }
}

fn check_x_range(_bounds: &ValidationConfig, event: &Event) -> Option<FieldViolation> {
    let x = event.x();
    (!(0.0..=1.0).contains(&x)).then(|| violation("x", x, "x must be between 0 and 1."))
}

fn check_x_precision(bounds: &ValidationConfig, event: &Event) -> Option<FieldViolation> {
    let x = event.x();
    // Non-finite values are already reported by the range rule.
    if !x.is_finite() || fraction_digits(x) <= bounds.x_max_fraction_digits {
        return None;
    }
    Some(violation(
        "x",
        x,
        &format!(
            "x must have up to {} decimal places.",
            bounds.x_max_fraction_digits
        ),
    ))
}

fn check_y_min(bounds: &ValidationConfig, event: &Event) -> Option<FieldViolation> {
    let y = event.y();
    (y < bounds.y_min).then(|| {
        violation(
            "y",
            y,
            &format!("y must be greater than or equal to {}.", bounds.y_min),
        )
    })
}

fn check_y_max(bounds: &ValidationConfig, event: &Event) -> Option<FieldViolation> {
    let y = event.y();
    (y > bounds.y_max).then(|| {
        violation(
            "y",
            y,
            &format!("y must be less than or equal to {}.", bounds.y_max),
        )
    })
}

/// Count fractional digits in the shortest decimal form of `x`.
///
/// `f64`'s `Display` never uses exponent notation and always round-trips,
/// so `1e-3` renders as `0.001` and counts three digits.
fn fraction_digits(x: f64) -> usize {
    x.to_string()
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len())
}
