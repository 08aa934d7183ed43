//! Time handling utilities for dimension subsets.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}

/// Parse an ISO 8601 / xs:dateTime literal into a UTC instant.
///
/// Supports:
/// - Full datetime with zone: "2024-01-15T12:00:00Z", "2024-01-15T12:00:00.250+02:00"
/// - Datetime without zone (assumed UTC): "2024-01-15T12:00:00"
/// - Date only, optionally zoned with "Z": "2024-01-15", "2024-01-15Z"
/// - xs:gYearMonth and xs:gYear: "2024-01", "2024", "2024Z"
///
/// Year-month and year literals resolve to the first instant of the period.
/// A year needs at least four digits, so short numbers like "15" are rejected.
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    // Try date only
    let date = s.strip_suffix('Z').unwrap_or(s);
    if let Ok(nd) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        if let Some(ndt) = nd.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Some(nd) = parse_year_month(date) {
        if let Some(ndt) = nd.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// First day of a `YYYY` or `YYYY-MM` period.
fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let (year, month) = match s.split_once('-') {
        Some((year, month)) if month.len() == 2 && month.bytes().all(|b| b.is_ascii_digit()) => {
            (year, month.parse::<u32>().ok()?)
        }
        Some(_) => return None,
        None => (s, 1),
    };
    if year.len() < 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)
}
