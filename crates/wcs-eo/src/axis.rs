//! Axis label normalization and dimension alias tables.

use wcs_common::{WcsError, WcsResult};

/// URI prefixes stripped from axis labels, in matching order.
pub const AXIS_PREFIXES: &[&str] = &[
    "http://www.opengis.net/def/axis/OGC/0/",
    "http://opengis.net/def/axis/OGC/0/",
    "http://opengis.net/def/crs/ISO/2004/",
];

/// Lowercase labels recognized as the time dimension.
pub const TIME_NAMES: &[&str] = &["t", "time", "temporal", "phenomenontime"];

/// Lowercase labels recognized as the elevation dimension.
pub const ELEVATION_NAMES: &[&str] = &["elevation"];

/// Strip a known URI prefix from a raw axis label.
///
/// Only the first matching prefix is removed. Fails with `InvalidAxisLabel`
/// when nothing is left.
pub fn parse_dimension_name(raw: &str) -> WcsResult<String> {
    AxisLabelParser::default().parse(raw)
}

/// Case-insensitive membership test against an alias table.
pub fn matches_alias(name: &str, aliases: &[&str]) -> bool {
    let lower = name.to_lowercase();
    aliases.iter().any(|alias| *alias == lower)
}

pub fn is_time_alias(name: &str) -> bool {
    matches_alias(name, TIME_NAMES)
}

pub fn is_elevation_alias(name: &str) -> bool {
    matches_alias(name, ELEVATION_NAMES)
}

/// Axis label normalizer with a configurable prefix list.
///
/// The built-in prefixes always come first; extra prefixes are tried after them.
#[derive(Debug, Clone)]
pub struct AxisLabelParser {
    prefixes: Vec<String>,
}

impl Default for AxisLabelParser {
    fn default() -> Self {
        Self {
            prefixes: AXIS_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl AxisLabelParser {
    pub fn with_extra_prefixes<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parser = Self::default();
        for prefix in extra {
            let prefix = prefix.into();
            if !prefix.is_empty() && !parser.prefixes.contains(&prefix) {
                parser.prefixes.push(prefix);
            }
        }
        parser
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn parse(&self, raw: &str) -> WcsResult<String> {
        let name = self
            .prefixes
            .iter()
            .find_map(|prefix| raw.strip_prefix(prefix.as_str()))
            .unwrap_or(raw);

        if name.is_empty() {
            return Err(WcsError::invalid_axis_label(format!(
                "Empty/invalid axis label provided: {}",
                raw
            )));
        }

        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wcs_common::WcsExceptionCode;

    #[test]
    fn test_strip_axis_prefix() {
        assert_eq!(
            parse_dimension_name("http://www.opengis.net/def/axis/OGC/0/time").unwrap(),
            "time"
        );
        assert_eq!(
            parse_dimension_name("http://opengis.net/def/axis/OGC/0/elevation").unwrap(),
            "elevation"
        );
        assert_eq!(
            parse_dimension_name("http://opengis.net/def/crs/ISO/2004/phenomenonTime").unwrap(),
            "phenomenonTime"
        );
    }

    #[test]
    fn test_plain_label_passes_through() {
        assert_eq!(parse_dimension_name("WAVELENGTH").unwrap(), "WAVELENGTH");
    }

    #[test]
    fn test_only_first_prefix_is_stripped() {
        let raw = "http://opengis.net/def/axis/OGC/0/http://opengis.net/def/axis/OGC/0/t";
        assert_eq!(
            parse_dimension_name(raw).unwrap(),
            "http://opengis.net/def/axis/OGC/0/t"
        );
    }

    #[test]
    fn test_empty_label_after_stripping() {
        let err = parse_dimension_name("http://www.opengis.net/def/axis/OGC/0/").unwrap_err();
        assert_eq!(err.exception_code(), WcsExceptionCode::InvalidAxisLabel);
        assert_eq!(err.locator(), Some("subset"));
        assert!(err.to_string().contains("http://www.opengis.net/def/axis/OGC/0/"));

        assert!(parse_dimension_name("").is_err());
    }

    #[test]
    fn test_extra_prefixes() {
        let parser = AxisLabelParser::with_extra_prefixes(["urn:eo:axis:"]);
        assert_eq!(parser.prefixes().len(), AXIS_PREFIXES.len() + 1);
        assert_eq!(parser.parse("urn:eo:axis:elevation").unwrap(), "elevation");
        assert!(parse_dimension_name("urn:eo:axis:elevation").unwrap().starts_with("urn:"));
    }

    #[test]
    fn test_alias_matching_is_case_insensitive() {
        assert!(is_time_alias("TIME"));
        assert!(is_time_alias("PhenomenonTime"));
        assert!(is_time_alias("t"));
        assert!(!is_time_alias("times"));
        assert!(is_elevation_alias("Elevation"));
        assert!(!is_elevation_alias("height"));
    }
}
