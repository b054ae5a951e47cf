//! Human-readable relative times ("3 days ago", "in 2 weeks") and lenient
//! timestamp parsing for dates stored as strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::types::Timestamp;

/// Format `date` relative to the current time.
pub fn format_relative_time(date: Timestamp) -> String {
    format_relative_time_at(date, Utc::now())
}

/// Format `date` relative to `now`.
///
/// Units step from minutes to hours (60 min), days (24 h), weeks (7 d),
/// months (4 w, 30-day months) and years (12 months). Anything under a
/// minute in either direction is "just now".
///
/// The gap is rounded to the nearest second, so a date built from an
/// earlier reading of the clock does not lose a unit.
pub fn format_relative_time_at(date: Timestamp, now: Timestamp) -> String {
    let delta_ms = (date - now).num_milliseconds();
    let future = delta_ms > 0;
    let seconds = (delta_ms.unsigned_abs() + 500) / 1000;

    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return phrase(minutes, "minute", future);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return phrase(hours, "hour", future);
    }
    let days = hours / 24;
    if days < 7 {
        return phrase(days, "day", future);
    }
    if days < 28 {
        return phrase(days / 7, "week", future);
    }
    let months = (days / 30).max(1);
    if months < 12 {
        return phrase(months, "month", future);
    }
    phrase((days / 365).max(1), "year", future)
}

/// [`format_relative_time`] for a stored date string; empty when unparseable.
pub fn format_relative_time_str(date: &str) -> String {
    parse_timestamp(date)
        .map(format_relative_time)
        .unwrap_or_default()
}

fn phrase(count: u64, unit: &str, future: bool) -> String {
    let plural = if count == 1 { "" } else { "s" };
    if future {
        format!("in {count} {unit}{plural}")
    } else {
        format!("{count} {unit}{plural} ago")
    }
}

/// Parse an RFC 3339 timestamp, a zone-less ISO date-time, or a bare
/// `YYYY-MM-DD` date (taken as midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}
