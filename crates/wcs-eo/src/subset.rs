//! Dimension subset directives as extracted from a coverage request.

use serde::{Deserialize, Serialize};

/// One `subset` directive of a request, still carrying raw literals.
///
/// The axis label may be a plain name or an OGC axis URI; it is normalized by
/// the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DimensionSubset {
    /// Closed interval `[low, high]`.
    Trim {
        dimension: String,
        low: String,
        high: String,
    },
    /// Single point.
    Slice {
        dimension: String,
        slice_point: String,
    },
}

impl DimensionSubset {
    pub fn trim(
        dimension: impl Into<String>,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Self {
        DimensionSubset::Trim {
            dimension: dimension.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn slice(dimension: impl Into<String>, slice_point: impl Into<String>) -> Self {
        DimensionSubset::Slice {
            dimension: dimension.into(),
            slice_point: slice_point.into(),
        }
    }

    /// Raw axis label.
    pub fn dimension(&self) -> &str {
        match self {
            DimensionSubset::Trim { dimension, .. } | DimensionSubset::Slice { dimension, .. } => {
                dimension
            }
        }
    }
}

impl std::fmt::Display for DimensionSubset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionSubset::Trim {
                dimension,
                low,
                high,
            } => write!(f, "{}({},{})", dimension, low, high),
            DimensionSubset::Slice {
                dimension,
                slice_point,
            } => write!(f, "{}({})", dimension, slice_point),
        }
    }
}
