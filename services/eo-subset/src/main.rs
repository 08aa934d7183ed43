//! EO subset resolver.
//!
//! Resolves the dimension subsets of a GetCoverage-style request against a
//! configured coverage and its granule index, applies default values and
//! prints the resulting coverage request as JSON.

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use wcs_common::BoundingBox;
use wcs_eo::granule::{elevation_domain, time_domain};
use wcs_eo::{
    CoverageConfig, CoverageReader, DefaultValuesHelper, DimensionSubset,
    DimensionSubsetResolver, EoConfig, EoCoverageCodec, Granule, GridCoverageRequest,
    InMemoryGranuleSource, WcsResult,
};

#[derive(Parser, Debug)]
#[command(name = "eo-subset")]
#[command(about = "Resolve WCS EO dimension subsets against a coverage")]
struct Args {
    /// Configuration file path (see `config/eo.yaml` for a sample)
    #[arg(short, long, default_value = "/etc/eo-subset/config.yaml")]
    config: String,

    /// Coverage name (`workspace:name`) or dataset series id
    #[arg(long)]
    coverage: String,

    /// JSON file holding the coverage's granule records
    #[arg(long)]
    granules: Option<String>,

    /// Subset directive, `dim=value` to slice or `dim=low,high` to trim
    #[arg(long = "subset", value_name = "DIM=VALUE")]
    subsets: Vec<String>,

    /// Spatial subset as minx,miny,maxx,maxy
    #[arg(long)]
    bbox: Option<String>,

    /// Output format; defaults are skipped without one or for NetCDF
    #[arg(long)]
    format: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = EoConfig::load(&args.config)?;
    let coverage = find_coverage(&config, &args.coverage)?;
    info!(coverage = %coverage.prefixed_name(), "Resolving subsets");

    let granules = match &args.granules {
        Some(path) => load_granules(path)?,
        None => Vec::new(),
    };
    info!(count = granules.len(), "Loaded granules");

    let subsets = args
        .subsets
        .iter()
        .map(|s| parse_subset(s))
        .collect::<Result<Vec<_>>>()?;

    let bbox = args
        .bbox
        .as_deref()
        .map(BoundingBox::parse)
        .transpose()
        .context("Invalid --bbox")?;

    let source = InMemoryGranuleSource::new(granules);
    match resolve(&config, coverage, &source, &subsets, bbox, args.format.as_deref()) {
        Ok(request) => {
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(())
        }
        Err(e) => {
            error!(
                code = %e.exception_code(),
                locator = ?e.locator(),
                error = %e,
                "Subset resolution failed"
            );
            let report = serde_json::json!({
                "exceptionCode": e.exception_code().as_str(),
                "locator": e.locator(),
                "text": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            std::process::exit(1);
        }
    }
}

/// Look the coverage up by dataset id first, then by name.
fn find_coverage<'a>(config: &'a EoConfig, id: &str) -> Result<&'a CoverageConfig> {
    EoCoverageCodec::new(config)
        .dataset_coverage(id)
        .or_else(|| config.find_coverage(id))
        .with_context(|| format!("Unknown coverage: {}", id))
}

fn load_granules(path: &str) -> Result<Vec<Granule>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse granules: {}", path))
}

/// Parse `dim=value` into a slice and `dim=low,high` into a trim.
fn parse_subset(arg: &str) -> Result<DimensionSubset> {
    let (dimension, value) = arg
        .split_once('=')
        .with_context(|| format!("Subset must be dim=value or dim=low,high: {}", arg))?;

    match value.split_once(',') {
        Some((low, high)) => Ok(DimensionSubset::trim(dimension.trim(), low.trim(), high.trim())),
        None => Ok(DimensionSubset::slice(dimension.trim(), value.trim())),
    }
}

fn resolve(
    config: &EoConfig,
    coverage: &CoverageConfig,
    source: &InMemoryGranuleSource,
    subsets: &[DimensionSubset],
    bbox: Option<BoundingBox>,
    format: Option<&str>,
) -> WcsResult<GridCoverageRequest> {
    let time = coverage.time_descriptor();
    let elevation = coverage.elevation_descriptor();
    let times = time.as_ref().map(|d| time_domain(source.all(), d));
    let elevations = elevation.as_ref().map(|d| elevation_domain(source.all(), d));

    let resolver = DimensionSubsetResolver::new(subsets).with_axis_parser(config.axis_parser());
    let mut request = GridCoverageRequest::resolve(
        &resolver,
        times.as_ref(),
        elevations.as_ref(),
        &coverage.custom_dimension_names(),
    )?;
    if let Some(envelope) = bbox {
        request = request.with_spatial_subset(envelope);
    }

    let descriptors = coverage.dimension_descriptors();
    let reader = if coverage.structured {
        CoverageReader::Structured {
            descriptors: &descriptors,
            granules: source,
        }
    } else {
        CoverageReader::Standard {
            time_domain: times.as_ref(),
            elevation_domain: elevations.as_ref(),
        }
    };
    DefaultValuesHelper::new(reader).set_defaults(&mut request, format)?;

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wcs_eo::WcsError;

    const CONFIG: &str = r#"
coverages:
  - name: sst
    workspace: eo
    dataset: true
    structured: true
    dimensions:
      time:
        start_attribute: ingestion
      elevation:
        start_attribute: depth
"#;

    fn granules() -> Vec<Granule> {
        serde_json::from_str(
            r#"[
                {"id": "a", "attributes": {"ingestion": "2020-01-01T00:00:00Z", "depth": 0.0}},
                {"id": "b", "attributes": {"ingestion": "2020-01-05T00:00:00Z", "depth": 10.0}}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_sample_config_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/eo.yaml");
        let config = EoConfig::load(path).unwrap();
        assert_eq!(config.count_default, Some(100));

        let sst = find_coverage(&config, "eo__sst_dss").unwrap();
        assert_eq!(sst.custom_dimension_names(), vec!["SENSOR".to_string()]);

        let dem = find_coverage(&config, "eo:dem").unwrap();
        assert!(!dem.has_time());
        assert!(dem.elevation_descriptor().is_some());
    }

    #[test]
    fn test_parse_subset() {
        assert_eq!(
            parse_subset("time=2020-01-01").unwrap(),
            DimensionSubset::slice("time", "2020-01-01")
        );
        assert_eq!(
            parse_subset("elevation = 0, 100").unwrap(),
            DimensionSubset::trim("elevation", "0", "100")
        );
        assert!(parse_subset("elevation").is_err());
    }

    #[test]
    fn test_find_coverage_by_dataset_id_or_name() {
        let config = EoConfig::from_yaml_str(CONFIG).unwrap();
        assert_eq!(find_coverage(&config, "eo__sst_dss").unwrap().name, "sst");
        assert_eq!(find_coverage(&config, "eo:sst").unwrap().name, "sst");
        assert!(find_coverage(&config, "nope").is_err());
    }

    #[test]
    fn test_resolve_snaps_and_defaults() {
        let config = EoConfig::from_yaml_str(CONFIG).unwrap();
        let coverage = find_coverage(&config, "eo:sst").unwrap();
        let source = InMemoryGranuleSource::new(granules());
        let subsets = vec![DimensionSubset::slice("time", "2020-01-02")];

        let request = resolve(&config, coverage, &source, &subsets, None, Some("image/tiff")).unwrap();
        let time = request.temporal_subset.unwrap();
        assert_eq!(time.low.to_rfc3339(), "2020-01-01T00:00:00+00:00");
        // No elevation directive, so the domain maximum applies
        assert_eq!(request.elevation_subset.unwrap().low, 10.0);
    }

    #[test]
    fn test_resolve_reports_trim() {
        let config = EoConfig::from_yaml_str(CONFIG).unwrap();
        let coverage = find_coverage(&config, "eo:sst").unwrap();
        let source = InMemoryGranuleSource::new(granules());
        let subsets = vec![DimensionSubset::trim("time", "2020-01-01", "2020-01-05")];

        let err = resolve(&config, coverage, &source, &subsets, None, None).unwrap_err();
        assert!(err.is_unsupported());
        assert!(matches!(err, WcsError::TrimmingNotSupported { .. }));
    }
}
