//! Granule records of a dataset series and the descriptors naming their
//! dimension attributes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wcs_common::BoundingBox;

use crate::domain::{Domain, DomainValue, Scalar};

/// An attribute value stored in the granule index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Time(DateTime<Utc>),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            AttributeValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Compare two values of the same kind; mixed kinds are unordered.
    pub fn compare(&self, other: &AttributeValue) -> Option<Ordering> {
        match (self, other) {
            (AttributeValue::Time(a), AttributeValue::Time(b)) => Some(a.cmp(b)),
            (AttributeValue::Number(a), AttributeValue::Number(b)) => Some(a.compare(b)),
            (AttributeValue::Text(a), AttributeValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttributeValue::Time(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// One granule (feature) of a structured coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Granule {
    pub id: String,

    /// Footprint in the coverage's native CRS.
    #[serde(default)]
    pub footprint: Option<BoundingBox>,

    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Granule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            footprint: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_footprint(mut self, footprint: BoundingBox) -> Self {
        self.footprint = Some(footprint);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

/// Names the granule attributes holding a dimension's values.
///
/// Without an end attribute each granule carries a single value; with one it
/// covers the closed range `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDescriptor {
    pub name: String,
    pub start_attribute: String,
    #[serde(default)]
    pub end_attribute: Option<String>,
}

impl DimensionDescriptor {
    pub fn new(name: impl Into<String>, start_attribute: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_attribute: start_attribute.into(),
            end_attribute: None,
        }
    }

    pub fn with_end_attribute(mut self, end_attribute: impl Into<String>) -> Self {
        self.end_attribute = Some(end_attribute.into());
        self
    }

    pub fn is_time(&self) -> bool {
        self.name.eq_ignore_ascii_case("time")
    }

    pub fn is_elevation(&self) -> bool {
        self.name.eq_ignore_ascii_case("elevation")
    }
}

fn domain_from_granules<T, F>(
    granules: &[Granule],
    descriptor: &DimensionDescriptor,
    extract: F,
) -> Domain<T>
where
    T: Scalar,
    F: Fn(&AttributeValue) -> Option<T>,
{
    let mut values = Vec::with_capacity(granules.len());
    for granule in granules {
        let Some(start) = granule.attribute(&descriptor.start_attribute).and_then(&extract) else {
            debug!(granule = %granule.id, attribute = %descriptor.start_attribute, "Granule has no usable dimension value");
            continue;
        };

        let end = descriptor
            .end_attribute
            .as_deref()
            .and_then(|name| granule.attribute(name))
            .and_then(&extract);

        values.push(match end {
            Some(end) => DomainValue::range(start, end),
            None => DomainValue::Scalar(start),
        });
    }
    Domain::new(values)
}

/// Build a time domain from the granules' time attributes.
pub fn time_domain(granules: &[Granule], descriptor: &DimensionDescriptor) -> Domain<DateTime<Utc>> {
    domain_from_granules(granules, descriptor, AttributeValue::as_time)
}

/// Build an elevation domain from the granules' elevation attributes.
pub fn elevation_domain(granules: &[Granule], descriptor: &DimensionDescriptor) -> Domain<f64> {
    domain_from_granules(granules, descriptor, AttributeValue::as_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_time_domain_from_scalar_granules() {
        let granules = vec![
            Granule::new("g1").with_attribute("ingestion", day(3)),
            Granule::new("g2").with_attribute("ingestion", day(1)),
            Granule::new("g3").with_attribute("ingestion", day(3)),
            Granule::new("g4"),
        ];
        let domain = time_domain(&granules, &DimensionDescriptor::new("time", "ingestion"));
        assert_eq!(domain.flatten(), vec![day(1), day(3)]);
    }

    #[test]
    fn test_range_domain_from_start_end() {
        let descriptor = DimensionDescriptor::new("elevation", "low").with_end_attribute("high");
        let granules = vec![
            Granule::new("a").with_attribute("low", 0.0).with_attribute("high", 100.0),
            Granule::new("b").with_attribute("low", 200.0),
        ];
        let domain = elevation_domain(&granules, &descriptor);
        assert_eq!(
            domain.values(),
            &[DomainValue::Range { min: 0.0, max: 100.0 }, DomainValue::Scalar(200.0)]
        );
    }

    #[test]
    fn test_attribute_deserialization() {
        let json = r#"{
            "id": "s2_001",
            "footprint": {"min_x": 0.0, "min_y": 0.0, "max_x": 1.0, "max_y": 1.0},
            "attributes": {"time": "2021-06-01T00:00:00Z", "elevation": 250.0, "band": "B04"}
        }"#;
        let granule: Granule = serde_json::from_str(json).unwrap();
        assert_eq!(granule.attribute("time"), Some(&AttributeValue::Time(day(1))));
        assert_eq!(granule.attribute("elevation").and_then(|v| v.as_number()), Some(250.0));
        assert_eq!(granule.attribute("band"), Some(&AttributeValue::Text("B04".into())));
    }

    #[test]
    fn test_mixed_kinds_are_unordered() {
        let t = AttributeValue::from(day(1));
        let n = AttributeValue::from(1.0);
        assert_eq!(t.compare(&n), None);
        assert_eq!(n.compare(&AttributeValue::from(2.0)), Some(Ordering::Less));
    }

    #[test]
    fn test_descriptor_names() {
        assert!(DimensionDescriptor::new("TIME", "t").is_time());
        assert!(DimensionDescriptor::new("Elevation", "z").is_elevation());
    }
}
