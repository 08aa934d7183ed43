//! Common types and utilities shared across the WCS 2.0 EO crates.

pub mod bbox;
pub mod error;
pub mod time;

pub use bbox::{BboxParseError, BoundingBox};
pub use error::{WcsError, WcsExceptionCode, WcsResult, SUBSET_LOCATOR};
pub use time::{parse_iso8601, TimeParseError};
