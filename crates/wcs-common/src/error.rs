//! Error types for the WCS 2.0 EO services.

use serde::Serialize;
use thiserror::Error;

use crate::time::TimeParseError;

/// Locator reported for every dimension subsetting failure.
pub const SUBSET_LOCATOR: &str = "subset";

/// Result type alias using WcsError.
pub type WcsResult<T> = Result<T, WcsError>;

/// OGC WCS 2.0 exception codes produced by these crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WcsExceptionCode {
    InvalidAxisLabel,
    InvalidSubsetting,
    InvalidParameterValue,
    MissingParameterValue,
    NoSuchCoverage,
    NoApplicableCode,
}

impl WcsExceptionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WcsExceptionCode::InvalidAxisLabel => "InvalidAxisLabel",
            WcsExceptionCode::InvalidSubsetting => "InvalidSubsetting",
            WcsExceptionCode::InvalidParameterValue => "InvalidParameterValue",
            WcsExceptionCode::MissingParameterValue => "MissingParameterValue",
            WcsExceptionCode::NoSuchCoverage => "NoSuchCoverage",
            WcsExceptionCode::NoApplicableCode => "NoApplicableCode",
        }
    }
}

impl std::fmt::Display for WcsExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary error type for WCS operations.
///
/// All variants describe a malformed or unsatisfiable client request, except
/// `Internal`. None of them are meant to be retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WcsError {
    // === Subsetting errors ===
    #[error("{message}")]
    InvalidAxisLabel { locator: String, message: String },

    #[error("{message}")]
    InvalidSubsetting { locator: String, message: String },

    #[error("Trimming on {dimension} is not supported at the moment, only slicing is")]
    TrimmingNotSupported { locator: String, dimension: String },

    // === Request errors ===
    #[error("Invalid parameter value for '{locator}': {message}")]
    InvalidParameter { locator: String, message: String },

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("No such coverage: {0}")]
    NoSuchCoverage(String),

    // === Infrastructure errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WcsError {
    pub fn invalid_axis_label(message: impl Into<String>) -> Self {
        WcsError::InvalidAxisLabel {
            locator: SUBSET_LOCATOR.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_subsetting(message: impl Into<String>) -> Self {
        WcsError::InvalidSubsetting {
            locator: SUBSET_LOCATOR.to_string(),
            message: message.into(),
        }
    }

    pub fn trimming_not_supported(dimension: impl Into<String>) -> Self {
        WcsError::TrimmingNotSupported {
            locator: SUBSET_LOCATOR.to_string(),
            dimension: dimension.into(),
        }
    }

    /// Get the OGC exception code for this error.
    ///
    /// Unsupported trimming is reported as `InvalidSubsetting` on the wire even
    /// though it keeps its own variant.
    pub fn exception_code(&self) -> WcsExceptionCode {
        match self {
            WcsError::InvalidAxisLabel { .. } => WcsExceptionCode::InvalidAxisLabel,
            WcsError::InvalidSubsetting { .. } | WcsError::TrimmingNotSupported { .. } => {
                WcsExceptionCode::InvalidSubsetting
            }
            WcsError::InvalidParameter { .. } => WcsExceptionCode::InvalidParameterValue,
            WcsError::MissingParameter(_) => WcsExceptionCode::MissingParameterValue,
            WcsError::NoSuchCoverage(_) => WcsExceptionCode::NoSuchCoverage,
            WcsError::Internal(_) => WcsExceptionCode::NoApplicableCode,
        }
    }

    /// Name of the offending request parameter, if any.
    pub fn locator(&self) -> Option<&str> {
        match self {
            WcsError::InvalidAxisLabel { locator, .. }
            | WcsError::InvalidSubsetting { locator, .. }
            | WcsError::TrimmingNotSupported { locator, .. }
            | WcsError::InvalidParameter { locator, .. } => Some(locator),
            WcsError::MissingParameter(param) => Some(param),
            WcsError::NoSuchCoverage(_) => Some("coverageId"),
            WcsError::Internal(_) => None,
        }
    }

    /// Whether this is the explicit "only slicing is supported" condition.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, WcsError::TrimmingNotSupported { .. })
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WcsError::InvalidAxisLabel { .. }
            | WcsError::InvalidSubsetting { .. }
            | WcsError::TrimmingNotSupported { .. }
            | WcsError::InvalidParameter { .. }
            | WcsError::MissingParameter(_) => 400,

            WcsError::NoSuchCoverage(_) => 404,

            WcsError::Internal(_) => 500,
        }
    }
}

impl From<TimeParseError> for WcsError {
    fn from(err: TimeParseError) -> Self {
        WcsError::invalid_subsetting(err.to_string())
    }
}

impl From<serde_json::Error> for WcsError {
    fn from(err: serde_json::Error) -> Self {
        WcsError::Internal(format!("JSON error: {}", err))
    }
}
