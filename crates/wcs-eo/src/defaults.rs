//! Default values for dimensions a request leaves unspecified.
//!
//! For 2D output formats an unconstrained dimension would match many granules,
//! so missing time/elevation subsets are pinned to a default. Plain readers use
//! the maximum of their domains; structured readers ask the granule index for
//! the most recent granule matching whatever the request did specify.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use wcs_common::{BoundingBox, WcsError, WcsResult};

use crate::domain::{ElevationDomain, ResolvedInterval, Scalar, TimeDomain};
use crate::filter::{GranuleFilter, GranuleQuery, GranuleSource, SortBy};
use crate::granule::{AttributeValue, DimensionDescriptor, Granule};
use crate::resolver::DimensionSubsetResolver;
use crate::values::CustomValue;

/// Output format able to carry every dimension, for which no defaults apply.
pub const NETCDF_OUTPUT_FORMAT: &str = "NETCDFOutputFormat";

/// The subsetting part of a coverage request after resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridCoverageRequest {
    pub temporal_subset: Option<ResolvedInterval<DateTime<Utc>>>,
    pub elevation_subset: Option<ResolvedInterval<f64>>,
    pub dimensions_subset: BTreeMap<String, Vec<CustomValue>>,
    pub spatial_subset: Option<BoundingBox>,
}

impl GridCoverageRequest {
    /// Run every extraction of `resolver` against the coverage's domains.
    pub fn resolve<S: AsRef<str>>(
        resolver: &DimensionSubsetResolver<'_>,
        time_domain: Option<&TimeDomain>,
        elevation_domain: Option<&ElevationDomain>,
        custom_dimensions: &[S],
    ) -> WcsResult<Self> {
        Ok(Self {
            temporal_subset: resolver.extract_temporal_subset(time_domain)?,
            elevation_subset: resolver.extract_elevation_subset(elevation_domain)?,
            dimensions_subset: resolver.extract_custom_dimensions_subset(custom_dimensions)?,
            spatial_subset: None,
        })
    }

    pub fn with_spatial_subset(mut self, envelope: BoundingBox) -> Self {
        self.spatial_subset = Some(envelope);
        self
    }
}

/// What the coverage's reader can tell us about its dimensions.
#[derive(Clone, Copy)]
pub enum CoverageReader<'a> {
    /// Reader exposing only its dimension domains.
    Standard {
        time_domain: Option<&'a TimeDomain>,
        elevation_domain: Option<&'a ElevationDomain>,
    },
    /// Reader backed by a granule index.
    Structured {
        descriptors: &'a [DimensionDescriptor],
        granules: &'a dyn GranuleSource,
    },
}

/// Fills unspecified time/elevation subsets of a request.
#[derive(Clone, Copy)]
pub struct DefaultValuesHelper<'a> {
    reader: CoverageReader<'a>,
}

impl<'a> DefaultValuesHelper<'a> {
    pub fn new(reader: CoverageReader<'a>) -> Self {
        Self { reader }
    }

    /// Apply defaults for the given output format.
    ///
    /// Nothing happens when no format is given or the format is NetCDF.
    pub fn set_defaults(&self, request: &mut GridCoverageRequest, format: Option<&str>) -> WcsResult<()> {
        match format {
            Some(f) if !f.eq_ignore_ascii_case(NETCDF_OUTPUT_FORMAT) => {}
            _ => {
                debug!(format = ?format, "Skipping default dimension values");
                return Ok(());
            }
        }

        match self.reader {
            CoverageReader::Standard {
                time_domain,
                elevation_domain,
            } => {
                set_standard_defaults(request, time_domain, elevation_domain);
                Ok(())
            }
            CoverageReader::Structured {
                descriptors,
                granules,
            } => set_structured_defaults(request, descriptors, granules),
        }
    }
}

fn set_standard_defaults(
    request: &mut GridCoverageRequest,
    time_domain: Option<&TimeDomain>,
    elevation_domain: Option<&ElevationDomain>,
) {
    if request.temporal_subset.is_none() {
        request.temporal_subset = time_domain
            .and_then(|d| d.max_value())
            .map(ResolvedInterval::slice);
    }
    if request.elevation_subset.is_none() {
        request.elevation_subset = elevation_domain
            .and_then(|d| d.max_value())
            .map(ResolvedInterval::slice);
    }
}

fn set_structured_defaults(
    request: &mut GridCoverageRequest,
    descriptors: &[DimensionDescriptor],
    granules: &dyn GranuleSource,
) -> WcsResult<()> {
    let time = descriptors.iter().find(|d| d.is_time());
    let elevation = descriptors.iter().find(|d| d.is_elevation());

    let default_time_needed = request.temporal_subset.is_none() && time.is_some();
    let default_elevation_needed = request.elevation_subset.is_none() && elevation.is_some();
    if !default_time_needed && !default_elevation_needed {
        return Ok(());
    }

    // Max is the default policy, hence descending order
    let mut sort_by = Vec::new();
    if let Some(d) = time {
        sort_by.push(SortBy::descending(d.start_attribute.clone()));
    }
    if let Some(d) = elevation {
        sort_by.push(SortBy::descending(d.start_attribute.clone()));
    }

    let query = GranuleQuery {
        filter: granule_filter(request, time, elevation),
        sort_by,
        max_features: Some(1),
    };

    let Some(first) = granules.granules(&query)?.into_iter().next() else {
        debug!("No granule matches the specified subsets, leaving defaults unset");
        return Ok(());
    };
    debug!(granule = %first.id, "Taking default dimension values from granule");

    if let (true, Some(d)) = (default_time_needed, time) {
        request.temporal_subset = Some(interval_from_granule(&first, d, AttributeValue::as_time)?);
    }
    if let (true, Some(d)) = (default_elevation_needed, elevation) {
        request.elevation_subset = Some(interval_from_granule(&first, d, AttributeValue::as_number)?);
    }
    Ok(())
}

fn interval_from_granule<T, F>(
    granule: &Granule,
    descriptor: &DimensionDescriptor,
    extract: F,
) -> WcsResult<ResolvedInterval<T>>
where
    T: Scalar,
    F: Fn(&AttributeValue) -> Option<T>,
{
    let read = |attribute: &str| {
        granule.attribute(attribute).and_then(&extract).ok_or_else(|| {
            WcsError::Internal(format!(
                "Granule {} has no usable {} value in attribute {}",
                granule.id, descriptor.name, attribute
            ))
        })
    };

    let start = read(&descriptor.start_attribute)?;
    let end = match &descriptor.end_attribute {
        Some(end) => read(end)?,
        None => start,
    };
    Ok(ResolvedInterval::new(start, end))
}

/// Combined filter matching the request's elevation, time and spatial subsets.
///
/// A dimension contributes only when both its subset and its descriptor are
/// present.
pub fn granule_filter(
    request: &GridCoverageRequest,
    time: Option<&DimensionDescriptor>,
    elevation: Option<&DimensionDescriptor>,
) -> GranuleFilter {
    let mut filters = Vec::new();
    if let (Some(subset), Some(d)) = (&request.elevation_subset, elevation) {
        filters.push(GranuleFilter::dimension(d, subset.low, subset.high));
    }
    if let (Some(subset), Some(d)) = (&request.temporal_subset, time) {
        filters.push(GranuleFilter::dimension(d, subset.low, subset.high));
    }
    if let Some(envelope) = request.spatial_subset {
        filters.push(GranuleFilter::Within(envelope));
    }
    GranuleFilter::and(filters)
}
