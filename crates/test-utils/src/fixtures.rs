//! Common test fixtures for EO subsetting tests.

use chrono::{DateTime, TimeZone, Utc};

/// Midnight UTC on the given day.
pub fn ymd(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture date {}-{}-{}", year, month, day))
}

/// Instants used by the time domain scenarios.
pub mod times {
    use super::ymd;
    use chrono::{DateTime, Utc};

    /// The {2020-01-01, 2020-01-05, 2020-01-10} series.
    pub fn january_2020() -> Vec<DateTime<Utc>> {
        vec![ymd(2020, 1, 1), ymd(2020, 1, 5), ymd(2020, 1, 10)]
    }

    /// Latest instant of [`january_2020`].
    pub fn january_2020_latest() -> DateTime<Utc> {
        ymd(2020, 1, 10)
    }
}

/// Elevation levels, in meters.
pub mod elevations {
    pub const TENS: [f64; 3] = [10.0, 20.0, 30.0];

    /// Typical ocean model depth levels (negative down).
    pub const OCEAN_DEPTHS: [f64; 6] = [-500.0, -200.0, -100.0, -50.0, -10.0, 0.0];
}

/// Envelopes as (min_x, min_y, max_x, max_y).
pub mod envelopes {
    pub const MEDITERRANEAN: (f64, f64, f64, f64) = (-6.0, 30.0, 36.5, 46.0);
}

/// Axis labels as they arrive on the wire.
pub mod axes {
    pub const TIME_URI: &str = "http://www.opengis.net/def/axis/OGC/0/time";
    pub const ELEVATION_URI: &str = "http://opengis.net/def/axis/OGC/0/elevation";
    pub const PHENOMENON_TIME_ISO: &str = "http://opengis.net/def/crs/ISO/2004/phenomenonTime";
}

/// EO configuration with one valid dataset series (`eo:sst`), one coverage
/// without the dataset flag (`eo:chl`) and a plain coverage (`dem`).
pub const EO_CONFIG_YAML: &str = r#"
count_default: 10
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
      custom:
        - name: SENSOR
          start_attribute: sensor
  - name: chl
    workspace: eo
    structured: true
    dimensions:
      time:
        start_attribute: ingestion
  - name: dem
"#;
