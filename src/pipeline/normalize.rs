//! Timestamp normalisation: ambiguous numeric fields → localised dates.
//!
//! ## Why guess at all?
//!
//! The tabular-data source delivers every date column as a bare Unix
//! epoch number, indistinguishable from any other numeric field. Users
//! write `{{ date }}` in a template and expect `17/11/2023`, not
//! `1700000000`. The heuristic here treats any number inside a plausible
//! calendar range as an epoch and formats it before substitution.
//!
//! The range check is deliberately the same one the upstream data source
//! produces dates in: values between the year-2000 epoch and an upper
//! bound wide enough to cover millisecond epochs. Large non-date numbers
//! inside the window (e.g. monetary amounts in the billions) will be
//! misread as dates; narrowing the bounds is a product decision, not one
//! this module takes.

use crate::template::Record;
use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::warn;

/// Inclusive lower bound: 2000-01-01T00:00:00Z in epoch seconds.
const EPOCH_MIN: f64 = 946_684_800.0;

/// Inclusive upper bound, wide enough to admit millisecond epochs.
const EPOCH_MAX: f64 = 4_000_000_000_000.0;

/// Magnitudes above this are millisecond epochs and are divided down to
/// seconds before conversion.
const MILLIS_CUTOFF: f64 = 10_000_000_000.0;

/// True when the value is a number inside the plausible calendar-epoch
/// window. Booleans are never timestamps, whatever their numeric form.
pub fn is_timestamp(value: &Value) -> bool {
    if value.is_boolean() {
        return false;
    }
    match value.as_f64() {
        Some(n) => (EPOCH_MIN..=EPOCH_MAX).contains(&n),
        None => false,
    }
}

/// Format an epoch value (seconds or milliseconds) with the given
/// strftime-style format, in the host-local timezone.
///
/// Returns `None` when the value falls outside what the calendar can
/// represent; callers fall back to the original value's string form.
pub fn format_epoch(value: f64, format: &str) -> Option<String> {
    let secs = if value > MILLIS_CUTOFF {
        value / 1000.0
    } else {
        value
    };
    let dt = DateTime::from_timestamp(secs as i64, 0)?;
    Some(dt.with_timezone(&Local).format(format).to_string())
}

/// Produce a derived record with every plausible timestamp field
/// replaced by its localised date string. All other fields pass through
/// unchanged; the input record is never mutated.
///
/// A conversion failure for one field keeps that field as its string
/// form and the rest of the record processes normally.
pub fn normalize_record(record: &Record, date_format: &str) -> Record {
    record
        .iter()
        .map(|(key, value)| {
            let normalized = if is_timestamp(value) {
                // as_f64 cannot fail here: is_timestamp only passes numbers
                let n = value.as_f64().unwrap_or_default();
                match format_epoch(n, date_format) {
                    Some(date) => Value::String(date),
                    None => {
                        warn!("Field '{}': epoch {} not representable, keeping raw value", key, n);
                        Value::String(stringify(value))
                    }
                }
            } else {
                value.clone()
            };
            (key.clone(), normalized)
        })
        .collect()
}

/// Scalar value → display string (strings unquoted, null empty).
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
