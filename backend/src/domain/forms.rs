//! Form field coercion.
//!
//! Browsers submit every input as text and send empty inputs as empty
//! strings. These helpers fold whitespace-only values to `None` and parse
//! the date/time formats the planner's date pickers produce.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Trim a submitted value, treating empty and whitespace-only as absent.
pub fn clean(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Trim a submitted value into an owned string, empty when absent.
pub fn clean_text(value: Option<&str>) -> String {
    clean(value).unwrap_or_default().to_string()
}

/// Parse a date input (`YYYY-MM-DD`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parse a time input. Time pickers send `HH:MM`, some send seconds too.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Parse a combined date-time input.
///
/// The legacy picker submits `YYYY-MM-DD HH:MM`; `datetime-local` inputs
/// use a `T` separator, and RFC 3339 is accepted for API clients. Values
/// without an offset are taken as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    None
}
