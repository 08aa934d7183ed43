//! End-to-end tests over a configured dataset series: configuration loading,
//! default values from the granule index and DescribeEOCoverageSet shaping.

use std::collections::HashMap;
use std::io::Write;

use test_utils::{daily_times, envelopes, granule_grid_json, ymd, EO_CONFIG_YAML};
use wcs_common::{BoundingBox, WcsExceptionCode};
use wcs_eo::coverage_set::describe_coverage_set;
use wcs_eo::granule::{elevation_domain, time_domain};
use wcs_eo::{
    CoverageReader, DefaultValuesHelper, DescribeEoCoverageSetRequest, DimensionSubset,
    DimensionSubsetResolver, EoConfig, EoCoverageCodec, Granule, GridCoverageRequest,
    InMemoryGranuleSource, ResolvedInterval, Section,
};

fn config() -> EoConfig {
    EoConfig::from_yaml_str(EO_CONFIG_YAML).unwrap()
}

/// Three days at two depths (0 and 10), six granules.
fn sst_granules() -> Vec<Granule> {
    let (min_x, min_y, max_x, max_y) = envelopes::MEDITERRANEAN;
    let json = granule_grid_json(
        "sst",
        &daily_times(ymd(2020, 1, 1), 3),
        "ingestion",
        &[0.0, 10.0],
        "depth",
        BoundingBox::new(min_x, min_y, max_x, max_y),
    );
    serde_json::from_value(json).unwrap()
}

fn catalog() -> HashMap<String, InMemoryGranuleSource> {
    let mut catalog = HashMap::new();
    catalog.insert("eo:sst".to_string(), InMemoryGranuleSource::new(sst_granules()));
    catalog
}

fn describe_request(subsets: Vec<DimensionSubset>) -> DescribeEoCoverageSetRequest {
    DescribeEoCoverageSetRequest {
        eo_ids: vec!["eo__sst_dss".to_string()],
        subsets,
        ..Default::default()
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(EO_CONFIG_YAML.as_bytes()).unwrap();

    let config = EoConfig::load(file.path()).unwrap();
    assert_eq!(config.count_default, Some(10));
    assert_eq!(config.coverages.len(), 3);
    let sst = config.find_coverage("eo:sst").unwrap();
    assert_eq!(sst.custom_dimension_names(), vec!["SENSOR".to_string()]);
}

#[test]
fn test_load_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(EoConfig::load(dir.path().join("missing.yaml")).is_err());
}

#[test]
fn test_dataset_ids() {
    let config = config();
    let codec = EoCoverageCodec::new(&config);

    let sst = config.find_coverage("eo:sst").unwrap();
    assert_eq!(codec.dataset_name(sst).unwrap(), "eo__sst_dss");
    assert_eq!(codec.dataset_coverage("eo__sst_dss").unwrap().name, "sst");
    assert_eq!(codec.granule_id(sst, "sst.0.1"), "eo__sst_granule_sst.0.1");

    // Not flagged as dataset, or missing the suffix
    let chl = config.find_coverage("eo:chl").unwrap();
    assert!(codec.dataset_name(chl).is_err());
    assert!(codec.dataset_coverage("eo__chl_dss").is_none());
    assert!(codec.dataset_coverage("eo__sst").is_none());
}

// ============================================================================
// Resolution against granule-derived domains
// ============================================================================

#[test]
fn test_resolve_against_granule_domains() {
    let config = config();
    let sst = config.find_coverage("eo:sst").unwrap();
    let granules = sst_granules();
    let times = time_domain(&granules, &sst.time_descriptor().unwrap());
    let depths = elevation_domain(&granules, &sst.elevation_descriptor().unwrap());

    let subsets = vec![
        DimensionSubset::slice("time", "2020-01-02T20:00:00Z"),
        DimensionSubset::slice("elevation", "3"),
        DimensionSubset::slice("SENSOR", "7"),
    ];
    let resolver = DimensionSubsetResolver::new(&subsets).with_axis_parser(config.axis_parser());
    let request = GridCoverageRequest::resolve(
        &resolver,
        Some(&times),
        Some(&depths),
        &sst.custom_dimension_names(),
    )
    .unwrap();

    assert_eq!(request.temporal_subset, Some(ResolvedInterval::slice(ymd(2020, 1, 3))));
    assert_eq!(request.elevation_subset, Some(ResolvedInterval::slice(0.0)));
    assert_eq!(request.dimensions_subset.len(), 1);
}

// ============================================================================
// Default values
// ============================================================================

#[test]
fn test_structured_defaults_take_latest_granule() {
    let config = config();
    let sst = config.find_coverage("eo:sst").unwrap();
    let descriptors = sst.dimension_descriptors();
    let source = InMemoryGranuleSource::new(sst_granules());
    let helper = DefaultValuesHelper::new(CoverageReader::Structured {
        descriptors: &descriptors,
        granules: &source,
    });

    let mut request = GridCoverageRequest::default();
    helper.set_defaults(&mut request, Some("image/tiff")).unwrap();
    assert_eq!(request.temporal_subset, Some(ResolvedInterval::slice(ymd(2020, 1, 3))));
    assert_eq!(request.elevation_subset, Some(ResolvedInterval::slice(10.0)));
}

#[test]
fn test_structured_defaults_respect_specified_dimension() {
    let config = config();
    let descriptors = config.find_coverage("eo:sst").unwrap().dimension_descriptors();
    let source = InMemoryGranuleSource::new(sst_granules());
    let helper = DefaultValuesHelper::new(CoverageReader::Structured {
        descriptors: &descriptors,
        granules: &source,
    });

    let mut request = GridCoverageRequest {
        temporal_subset: Some(ResolvedInterval::slice(ymd(2020, 1, 1))),
        ..Default::default()
    };
    helper.set_defaults(&mut request, Some("image/tiff")).unwrap();
    assert_eq!(request.temporal_subset, Some(ResolvedInterval::slice(ymd(2020, 1, 1))));
    assert_eq!(request.elevation_subset, Some(ResolvedInterval::slice(10.0)));
}

#[test]
fn test_netcdf_skips_defaults() {
    let config = config();
    let descriptors = config.find_coverage("eo:sst").unwrap().dimension_descriptors();
    let source = InMemoryGranuleSource::new(sst_granules());
    let helper = DefaultValuesHelper::new(CoverageReader::Structured {
        descriptors: &descriptors,
        granules: &source,
    });

    let mut request = GridCoverageRequest::default();
    helper.set_defaults(&mut request, Some("NETCDFOutputFormat")).unwrap();
    helper.set_defaults(&mut request, None).unwrap();
    assert_eq!(request, GridCoverageRequest::default());
}

// ============================================================================
// DescribeEOCoverageSet
// ============================================================================

#[test]
fn test_describe_all_granules() {
    let description = describe_coverage_set(&describe_request(vec![]), &config(), &catalog()).unwrap();

    assert_eq!(description.number_matched, 6);
    assert_eq!(description.number_returned, 6);
    assert_eq!(description.coverage_descriptions.len(), 1);
    let coverage = &description.coverage_descriptions[0];
    assert_eq!(coverage.dataset_id, "eo__sst_dss");
    assert!(coverage.granule_ids.iter().all(|id| id.starts_with("eo__sst_granule_")));

    let series = &description.dataset_series_descriptions[0];
    assert_eq!(
        series.time_period,
        Some(ResolvedInterval::new(ymd(2020, 1, 1), ymd(2020, 1, 3)))
    );
}

#[test]
fn test_describe_with_count_and_subset() {
    let mut request = describe_request(vec![DimensionSubset::trim(
        "time",
        "2020-01-02T00:00:00Z",
        "2020-01-03T00:00:00Z",
    )]);
    request.count = 3;

    let description = describe_coverage_set(&request, &config(), &catalog()).unwrap();
    assert_eq!(description.number_matched, 4);
    assert_eq!(description.number_returned, 3);
    assert_eq!(description.coverage_descriptions[0].granule_ids.len(), 3);
}

#[test]
fn test_describe_sections() {
    let mut request = describe_request(vec![]);
    request.sections = Some(vec![Section::DatasetSeriesDescriptions]);

    let description = describe_coverage_set(&request, &config(), &catalog()).unwrap();
    assert!(description.coverage_descriptions.is_empty());
    assert_eq!(description.dataset_series_descriptions.len(), 1);
    assert_eq!(description.number_matched, 6);
}

#[test]
fn test_describe_errors() {
    let config = config();

    let missing = DescribeEoCoverageSetRequest::default();
    let err = describe_coverage_set(&missing, &config, &catalog()).unwrap_err();
    assert_eq!(err.exception_code(), WcsExceptionCode::MissingParameterValue);

    let mut unknown = describe_request(vec![]);
    unknown.eo_ids = vec!["eo__chl_dss".to_string()];
    let err = describe_coverage_set(&unknown, &config, &catalog()).unwrap_err();
    assert_eq!(err.exception_code(), WcsExceptionCode::NoSuchCoverage);
    assert_eq!(err.http_status_code(), 404);

    let inverted = describe_request(vec![DimensionSubset::trim("elevation", "10", "0")]);
    let err = describe_coverage_set(&inverted, &config, &catalog()).unwrap_err();
    assert_eq!(err.exception_code(), WcsExceptionCode::InvalidSubsetting);
}
