//! Lenient literal parsers for slice points and custom dimension values.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use wcs_common::parse_iso8601;

use crate::domain::DomainValue;

/// Parse a string as a date, or `None` if impossible.
pub fn parse_as_date(text: &str) -> Option<DateTime<Utc>> {
    match parse_iso8601(text) {
        Ok(dt) => Some(dt),
        Err(_) => {
            debug!("{} can't be parsed as a time", text);
            None
        }
    }
}

/// Parse a string as a 32-bit integer, or `None` if impossible.
pub fn parse_as_integer(text: &str) -> Option<i32> {
    match text.trim().parse::<i32>() {
        Ok(v) => Some(v),
        Err(_) => {
            debug!("{} can't be parsed as an Integer", text);
            None
        }
    }
}

/// Parse a string as a double, or `None` if impossible.
///
/// `INF`, `-INF` and `NaN` are accepted like any other double literal.
pub fn parse_as_double(text: &str) -> Option<f64> {
    match text.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            debug!("{} can't be parsed as a Double", text);
            None
        }
    }
}

/// Parse a "min/max" literal as a numeric range.
///
/// Anything other than exactly two parseable parts yields `None`.
pub fn parse_as_double_range(text: &str) -> Option<DomainValue<f64>> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 2 {
        return None;
    }
    let min = parse_as_double(parts[0])?;
    let max = parse_as_double(parts[1])?;
    Some(DomainValue::Range { min, max })
}

/// A custom dimension slice value, typed by the first parser that accepts it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CustomValue {
    Date(DateTime<Utc>),
    Integer(i32),
    Double(f64),
    Text(String),
}

impl CustomValue {
    /// Try date, then integer, then double, falling back to the raw text.
    pub fn parse(text: &str) -> Self {
        if let Some(dt) = parse_as_date(text) {
            return CustomValue::Date(dt);
        }
        if let Some(i) = parse_as_integer(text) {
            return CustomValue::Integer(i);
        }
        if let Some(d) = parse_as_double(text) {
            return CustomValue::Double(d);
        }
        CustomValue::Text(text.to_string())
    }
}

impl std::fmt::Display for CustomValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomValue::Date(dt) => write!(f, "{}", dt.to_rfc3339()),
            CustomValue::Integer(i) => write!(f, "{}", i),
            CustomValue::Double(d) => write!(f, "{}", d),
            CustomValue::Text(s) => f.write_str(s),
        }
    }
}
