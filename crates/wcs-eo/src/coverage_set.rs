//! DescribeEOCoverageSet result shaping.
//!
//! Maps dataset series identifiers to published coverages, collects their
//! granules (optionally narrowed by the requested subsets), counts matches and
//! truncates the granule lists to the requested or configured maximum.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wcs_common::{WcsError, WcsResult};

use crate::config::{CoverageConfig, EoConfig};
use crate::defaults::{granule_filter, GridCoverageRequest};
use crate::domain::ResolvedInterval;
use crate::filter::{GranuleQuery, GranuleSource};
use crate::granule::{time_domain, Granule};
use crate::resolver::DimensionSubsetResolver;
use crate::subset::DimensionSubset;

pub const DATASET_SUFFIX: &str = "_dss";
pub const GRANULE_SEPARATOR: &str = "_granule_";

/// NCName-safe coverage identifier: `workspace__name`, or just `name`.
pub fn encode_ncname(coverage: &CoverageConfig) -> String {
    match &coverage.workspace {
        Some(ws) => format!("{}__{}", ws, coverage.name),
        None => coverage.name.clone(),
    }
}

/// Maps coverages to dataset series and granule identifiers.
#[derive(Debug, Clone, Copy)]
pub struct EoCoverageCodec<'a> {
    config: &'a EoConfig,
}

impl<'a> EoCoverageCodec<'a> {
    pub fn new(config: &'a EoConfig) -> Self {
        Self { config }
    }

    /// A dataset needs the dataset flag, an enabled time dimension and a
    /// granule index.
    pub fn is_valid_dataset(coverage: &CoverageConfig) -> bool {
        coverage.dataset && coverage.has_time() && coverage.structured
    }

    pub fn dataset_name(&self, coverage: &CoverageConfig) -> WcsResult<String> {
        if !Self::is_valid_dataset(coverage) {
            return Err(WcsError::InvalidParameter {
                locator: "eoId".to_string(),
                message: format!(
                    "Specified coverage {} is not a valid EO dataset",
                    coverage.prefixed_name()
                ),
            });
        }
        Ok(format!("{}{}", encode_ncname(coverage), DATASET_SUFFIX))
    }

    /// Coverage behind a dataset id, or `None` if the id is malformed, unknown
    /// or names something that is not a valid dataset.
    pub fn dataset_coverage(&self, dataset_id: &str) -> Option<&'a CoverageConfig> {
        let Some(name) = dataset_id.strip_suffix(DATASET_SUFFIX) else {
            debug!("Invalid dataset id {} it does not end with {}", dataset_id, DATASET_SUFFIX);
            return None;
        };

        let coverage = self
            .config
            .coverages
            .iter()
            .find(|c| encode_ncname(c) == name)
            .filter(|c| Self::is_valid_dataset(c));
        if coverage.is_none() {
            debug!("Invalid dataset id {} does not match any published dataset", dataset_id);
        }
        coverage
    }

    pub fn granule_id(&self, coverage: &CoverageConfig, feature_id: &str) -> String {
        format!("{}{}{}", encode_ncname(coverage), GRANULE_SEPARATOR, feature_id)
    }
}

/// Response sections of DescribeEOCoverageSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    All,
    CoverageDescriptions,
    DatasetSeriesDescriptions,
}

impl Section {
    pub fn parse(s: &str) -> WcsResult<Self> {
        match s {
            "All" => Ok(Section::All),
            "CoverageDescriptions" => Ok(Section::CoverageDescriptions),
            "DatasetSeriesDescriptions" => Ok(Section::DatasetSeriesDescriptions),
            other => Err(WcsError::InvalidParameter {
                locator: "sections".to_string(),
                message: format!("Unknown section: {}", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribeEoCoverageSetRequest {
    pub eo_ids: Vec<String>,

    /// Requested maximum number of coverages, 0 when unspecified.
    #[serde(default)]
    pub count: u32,

    #[serde(default)]
    pub sections: Option<Vec<Section>>,

    #[serde(default)]
    pub subsets: Vec<DimensionSubset>,
}

impl DescribeEoCoverageSetRequest {
    /// Absent sections, or `All`, select everything.
    pub fn includes(&self, section: Section) -> bool {
        match &self.sections {
            None => true,
            Some(sections) => sections.contains(&Section::All) || sections.contains(&section),
        }
    }
}

/// Granule index lookup for published coverages.
pub trait GranuleCatalog {
    fn granule_source(&self, coverage: &CoverageConfig) -> Option<&dyn GranuleSource>;
}

/// Sources keyed by `workspace:name`.
impl<S: GranuleSource> GranuleCatalog for HashMap<String, S> {
    fn granule_source(&self, coverage: &CoverageConfig) -> Option<&dyn GranuleSource> {
        self.get(&coverage.prefixed_name())
            .map(|s| s as &dyn GranuleSource)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageGranules {
    pub dataset_id: String,
    pub granule_ids: Vec<String>,
    #[serde(skip)]
    pub granules: Vec<Granule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSeriesDescription {
    pub dataset_id: String,
    pub time_period: Option<ResolvedInterval<DateTime<Utc>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSetDescription {
    pub number_matched: usize,
    pub number_returned: usize,
    pub coverage_descriptions: Vec<CoverageGranules>,
    pub dataset_series_descriptions: Vec<DatasetSeriesDescription>,
}

/// A positive request count wins over the configured default.
pub fn max_coverages(count: u32, count_default: Option<u32>) -> Option<u32> {
    if count > 0 {
        Some(count)
    } else {
        count_default
    }
}

/// Truncate the per-coverage granule lists so that at most `max` granules are
/// returned overall, in coverage order.
///
/// The budget shrinks by each coverage's full size; iteration stops once it is
/// exhausted, so trailing coverages are dropped entirely.
pub fn apply_max_coverages(
    coverage_granules: Vec<CoverageGranules>,
    max: Option<u32>,
) -> Vec<CoverageGranules> {
    let Some(max) = max else {
        return coverage_granules;
    };

    let mut remaining = i64::from(max);
    let mut result = Vec::new();
    for mut cg in coverage_granules {
        let size = cg.granules.len() as i64;
        if size > remaining {
            let keep = remaining as usize;
            cg.granules.truncate(keep);
            cg.granule_ids.truncate(keep);
        }
        result.push(cg);
        remaining -= size;
        if remaining <= 0 {
            break;
        }
    }
    result
}

/// Answer a DescribeEOCoverageSet request.
pub fn describe_coverage_set(
    request: &DescribeEoCoverageSetRequest,
    config: &EoConfig,
    catalog: &dyn GranuleCatalog,
) -> WcsResult<CoverageSetDescription> {
    if request.eo_ids.is_empty() {
        return Err(WcsError::MissingParameter("eoId".to_string()));
    }

    let codec = EoCoverageCodec::new(config);
    let coverages = request
        .eo_ids
        .iter()
        .map(|id| {
            codec
                .dataset_coverage(id)
                .ok_or_else(|| WcsError::NoSuchCoverage(id.clone()))
        })
        .collect::<WcsResult<Vec<_>>>()?;

    let resolver = DimensionSubsetResolver::new(&request.subsets).with_axis_parser(config.axis_parser());
    let requested = GridCoverageRequest {
        temporal_subset: resolver.requested_temporal_interval()?,
        elevation_subset: resolver.requested_elevation_interval()?,
        ..Default::default()
    };

    let mut coverage_granules = Vec::with_capacity(coverages.len());
    let mut dataset_series = Vec::with_capacity(coverages.len());
    for coverage in &coverages {
        let source = catalog.granule_source(coverage).ok_or_else(|| {
            WcsError::Internal(format!(
                "Failed to load the coverage granules for coverage {}",
                coverage.prefixed_name()
            ))
        })?;

        let time = coverage.time_descriptor();
        let elevation = coverage.elevation_descriptor();
        let filter = granule_filter(&requested, time.as_ref(), elevation.as_ref());
        let granules = source.granules(&GranuleQuery::with_filter(filter))?;

        let dataset_id = codec.dataset_name(coverage)?;
        coverage_granules.push(CoverageGranules {
            dataset_id: dataset_id.clone(),
            granule_ids: granules
                .iter()
                .map(|g| codec.granule_id(coverage, &g.id))
                .collect(),
            granules,
        });

        if request.includes(Section::DatasetSeriesDescriptions) {
            let time_period = match &time {
                Some(descriptor) => {
                    let all = source.granules(&GranuleQuery::all())?;
                    let domain = time_domain(&all, descriptor);
                    domain
                        .min_value()
                        .zip(domain.max_value())
                        .map(|(begin, end)| ResolvedInterval::new(begin, end))
                }
                None => None,
            };
            dataset_series.push(DatasetSeriesDescription {
                dataset_id,
                time_period,
            });
        }
    }

    let number_matched: usize = coverage_granules.iter().map(|cg| cg.granules.len()).sum();
    let max = max_coverages(request.count, config.count_default);
    let number_returned = max.map_or(number_matched, |m| number_matched.min(m as usize));
    debug!(number_matched, number_returned, "Describing EO coverage set");

    let coverage_descriptions = if request.includes(Section::CoverageDescriptions) {
        apply_max_coverages(coverage_granules, max)
    } else {
        Vec::new()
    };

    Ok(CoverageSetDescription {
        number_matched,
        number_returned,
        coverage_descriptions,
        dataset_series_descriptions: dataset_series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cg(id: &str, n: usize) -> CoverageGranules {
        let granules: Vec<Granule> = (0..n).map(|i| Granule::new(format!("{}.{}", id, i))).collect();
        CoverageGranules {
            dataset_id: id.to_string(),
            granule_ids: granules.iter().map(|g| g.id.clone()).collect(),
            granules,
        }
    }

    fn sizes(list: &[CoverageGranules]) -> Vec<usize> {
        list.iter().map(|c| c.granules.len()).collect()
    }

    #[test]
    fn test_max_coverages() {
        assert_eq!(max_coverages(5, Some(20)), Some(5));
        assert_eq!(max_coverages(0, Some(20)), Some(20));
        assert_eq!(max_coverages(0, None), None);
    }

    #[test]
    fn test_apply_max_coverages_truncates_and_stops() {
        let list = vec![cg("a", 3), cg("b", 4), cg("c", 2)];
        let result = apply_max_coverages(list, Some(5));
        assert_eq!(sizes(&result), vec![3, 2]);
        assert_eq!(result[1].granule_ids.len(), 2);
    }

    #[test]
    fn test_apply_max_coverages_exact_fit_stops() {
        let list = vec![cg("a", 3), cg("b", 4)];
        assert_eq!(sizes(&apply_max_coverages(list, Some(3))), vec![3]);
    }

    #[test]
    fn test_apply_max_coverages_unlimited() {
        let list = vec![cg("a", 3), cg("b", 4)];
        assert_eq!(sizes(&apply_max_coverages(list, None)), vec![3, 4]);
    }

    #[test]
    fn test_sections() {
        let mut request = DescribeEoCoverageSetRequest::default();
        assert!(request.includes(Section::CoverageDescriptions));
        request.sections = Some(vec![Section::DatasetSeriesDescriptions]);
        assert!(!request.includes(Section::CoverageDescriptions));
        assert!(request.includes(Section::DatasetSeriesDescriptions));
        request.sections = Some(vec![Section::All]);
        assert!(request.includes(Section::CoverageDescriptions));
        assert!(Section::parse("Nope").is_err());
    }
}
