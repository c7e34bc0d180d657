//! Timestamp and calendar date utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Wire format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Check that a string has the exact `YYYY-MM-DD` shape (digits and dashes only)
pub fn is_date_shaped(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a `YYYY-MM-DD` string into a calendar date
///
/// Anything that is not exactly date-shaped, or names a day that does not
/// exist (e.g. `2025-02-30`), yields `None`. Callers store that as an
/// absent date rather than failing the request.
///
/// # Examples
///
/// ```
/// use mboard_common::time::parse_date;
///
/// assert!(parse_date("2025-01-31").is_some());
/// assert!(parse_date("2025-1-31").is_none());
/// assert!(parse_date("2025-02-30").is_none());
/// ```
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !is_date_shaped(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Normalize an optional JSON value into an optional date
///
/// Only JSON strings are considered; numbers, booleans, objects and `null`
/// all normalize to `None`.
pub fn date_from_json(value: &serde_json::Value) -> Option<NaiveDate> {
    value.as_str().and_then(parse_date)
}
