//! Dimension subset resolution.
//!
//! Turns the raw `subset` directives of a request into normalized intervals for
//! time and elevation (validated, snapped to the available domain, defaulting to
//! the most recent/highest value) and into typed values for custom dimensions.
//!
//! A resolver is built per request and holds no state beyond a borrow of the
//! directives, so it can be used freely from any worker thread.

use std::collections::BTreeMap;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::debug;
use wcs_common::{parse_iso8601, WcsError, WcsResult};

use crate::axis::{matches_alias, AxisLabelParser, ELEVATION_NAMES, TIME_NAMES};
use crate::domain::{Domain, ResolvedInterval, Scalar};
use crate::subset::DimensionSubset;
use crate::values::{parse_as_double, CustomValue};

/// How one of the built-in dimensions is recognized and parsed.
struct DimensionKind<T> {
    label: &'static str,
    aliases: &'static [&'static str],
    parse: fn(&str) -> WcsResult<T>,
}

fn parse_time(text: &str) -> WcsResult<DateTime<Utc>> {
    Ok(parse_iso8601(text)?)
}

fn parse_elevation(text: &str) -> WcsResult<f64> {
    match parse_as_double(text) {
        Some(v) if !v.is_nan() => Ok(v),
        _ => Err(WcsError::invalid_subsetting(format!(
            "Invalid elevation value: {}",
            text
        ))),
    }
}

const TIME: DimensionKind<DateTime<Utc>> = DimensionKind {
    label: "Time",
    aliases: TIME_NAMES,
    parse: parse_time,
};

const ELEVATION: DimensionKind<f64> = DimensionKind {
    label: "Elevation",
    aliases: ELEVATION_NAMES,
    parse: parse_elevation,
};

/// Resolves the subset directives of a single request.
#[derive(Debug, Clone)]
pub struct DimensionSubsetResolver<'a> {
    subsets: &'a [DimensionSubset],
    axis_parser: AxisLabelParser,
}

impl<'a> DimensionSubsetResolver<'a> {
    pub fn new(subsets: &'a [DimensionSubset]) -> Self {
        Self {
            subsets,
            axis_parser: AxisLabelParser::default(),
        }
    }

    /// Use a parser that knows additional axis URI prefixes.
    pub fn with_axis_parser(mut self, axis_parser: AxisLabelParser) -> Self {
        self.axis_parser = axis_parser;
        self
    }

    pub fn subsets(&self) -> &[DimensionSubset] {
        self.subsets
    }

    /// Resolve the time subset against the coverage's time domain.
    ///
    /// `domain` is `None` when the coverage has no time dimension, in which case
    /// the directives are not inspected and `Ok(None)` is returned. Without a
    /// time directive the result defaults to the latest time in the domain.
    pub fn extract_temporal_subset(
        &self,
        domain: Option<&Domain<DateTime<Utc>>>,
    ) -> WcsResult<Option<ResolvedInterval<DateTime<Utc>>>> {
        self.extract(&TIME, domain)
    }

    /// Resolve the elevation subset; same contract as the temporal one.
    pub fn extract_elevation_subset(
        &self,
        domain: Option<&Domain<f64>>,
    ) -> WcsResult<Option<ResolvedInterval<f64>>> {
        self.extract(&ELEVATION, domain)
    }

    /// The validated time interval as requested, without snapping or defaults.
    ///
    /// Genuine trims are allowed here; this is what granule filtering uses.
    pub fn requested_temporal_interval(
        &self,
    ) -> WcsResult<Option<ResolvedInterval<DateTime<Utc>>>> {
        self.requested_interval(&TIME)
    }

    /// The validated elevation interval as requested, without snapping or defaults.
    pub fn requested_elevation_interval(&self) -> WcsResult<Option<ResolvedInterval<f64>>> {
        self.requested_interval(&ELEVATION)
    }

    /// Collect slice values for the recognized custom dimensions.
    ///
    /// Names are matched case-sensitively after prefix stripping. Only slices
    /// are accepted; each value is typed by [`CustomValue::parse`] and is not
    /// snapped. When a dimension is sliced more than once the last directive wins.
    pub fn extract_custom_dimensions_subset<S: AsRef<str>>(
        &self,
        recognized: &[S],
    ) -> WcsResult<BTreeMap<String, Vec<CustomValue>>> {
        let mut result = BTreeMap::new();
        if recognized.is_empty() {
            return Ok(result);
        }

        for subset in self.subsets {
            let name = self.axis_parser.parse(subset.dimension())?;
            if !recognized.iter().any(|r| r.as_ref() == name) {
                continue;
            }

            match subset {
                DimensionSubset::Slice { slice_point, .. } => {
                    let value = CustomValue::parse(slice_point);
                    debug!(dimension = %name, value = %value, "Custom dimension slice");
                    result.insert(name, vec![value]);
                }
                DimensionSubset::Trim { .. } => {
                    return Err(WcsError::invalid_subsetting(format!(
                        "Invalid element found while attempting to parse dimension subsetting request: \
                         trimming is not allowed on custom dimension {} ({})",
                        name, subset
                    )));
                }
            }
        }

        Ok(result)
    }

    fn requested_interval<T: Scalar>(
        &self,
        kind: &DimensionKind<T>,
    ) -> WcsResult<Option<ResolvedInterval<T>>> {
        let mut requested: Option<ResolvedInterval<T>> = None;

        for subset in self.subsets {
            let name = self.axis_parser.parse(subset.dimension())?;
            if !matches_alias(&name, kind.aliases) {
                continue;
            }

            if requested.is_some() {
                return Err(WcsError::invalid_subsetting(format!(
                    "{} dimension trimming/slicing specified twice in the request",
                    kind.label
                )));
            }

            let interval = match subset {
                DimensionSubset::Trim { low, high, .. } => {
                    let low_value = (kind.parse)(low)?;
                    let high_value = (kind.parse)(high)?;
                    if low_value.compare(&high_value) == Ordering::Greater {
                        return Err(WcsError::invalid_subsetting(format!(
                            "Low greater than High: {}, {}",
                            low, high
                        )));
                    }
                    ResolvedInterval::new(low_value, high_value)
                }
                DimensionSubset::Slice { slice_point, .. } => {
                    ResolvedInterval::slice((kind.parse)(slice_point)?)
                }
            };
            requested = Some(interval);
        }

        Ok(requested)
    }

    fn extract<T: Scalar>(
        &self,
        kind: &DimensionKind<T>,
        domain: Option<&Domain<T>>,
    ) -> WcsResult<Option<ResolvedInterval<T>>> {
        let Some(domain) = domain else {
            return Ok(None);
        };

        match self.requested_interval(kind)? {
            Some(interval) if !interval.is_degenerate() => Err(WcsError::trimming_not_supported(
                kind.label.to_lowercase(),
            )),
            Some(interval) => Ok(Some(domain.snap(interval.low))),
            None => {
                let default = domain.max_value().map(ResolvedInterval::slice);
                debug!(
                    dimension = kind.label,
                    default = ?default,
                    "No subset requested, defaulting to domain maximum"
                );
                Ok(default)
            }
        }
    }
}
