//! Conversions between picker strings, unix seconds and display strings.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

use crate::error::ConsoleError;

/// Format the date/time picker produces, e.g. `10/17/2026 9:05 AM`.
pub const PICKER_FORMAT: &str = "%m/%d/%Y %I:%M %p";

const NAIVE_FORMATS: &[&str] = &[
    PICKER_FORMAT,
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Converts a picker value into unix seconds.
///
/// Accepts plain unix seconds, RFC 3339, and the naive formats in
/// [`NAIVE_FORMATS`] read in `offset`.
///
/// # Errors
///
/// Returns [`ConsoleError::InvalidTimestamp`] if no format matches or the
/// local time does not exist in `offset`.
pub fn parse_picker_time(input: &str, offset: FixedOffset) -> Result<i64, ConsoleError> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.timestamp());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.timestamp())
        .ok_or_else(|| ConsoleError::InvalidTimestamp(input.to_string()))
}

/// Formats unix seconds the way the picker displays them.
#[must_use]
pub fn format_picker_time(secs: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.with_timezone(&offset).format(PICKER_FORMAT).to_string())
        .unwrap_or_default()
}

/// Formats an event time for the results table.
///
/// `0` (absent) and out-of-range values render as an empty string.
#[must_use]
pub fn format_event_time(secs: i64, offset: FixedOffset) -> String {
    if secs == 0 {
        return String::new();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|dt| {
            dt.with_timezone(&offset)
                .format("%a %b %d %Y %H:%M:%S GMT%z")
                .to_string()
        })
        .unwrap_or_default()
}
