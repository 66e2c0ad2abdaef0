//! Lenient date parsing for request fields.
//!
//! Accepts RFC 3339 timestamps, zone-less `YYYY-MM-DDTHH:MM:SS` (read as UTC)
//! and plain `YYYY-MM-DD` dates (midnight UTC).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::ValidationError;

fn invalid(field: &str, value: &str) -> ValidationError {
    ValidationError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses a date or timestamp, naming `field` in the error.
pub fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    parse_day(trimmed)
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .ok_or_else(|| invalid(field, value))
}

/// Parses the inclusive upper bound of a range.
///
/// A plain date covers the whole day.
pub fn parse_end_date(field: &str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = value.trim();
    if let Some(day) = parse_day(trimmed) {
        let end = day
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .ok_or_else(|| invalid(field, value))?;
        return Ok(end.and_utc());
    }
    parse_date(field, value)
}

/// Parses an optional, possibly blank, date field.
pub fn parse_optional_date(
    field: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(field, v).map(Some),
    }
}
