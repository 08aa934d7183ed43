//! WCS 2.0 Earth Observation profile support.
//!
//! This crate resolves the dimension subsets of a coverage request against the
//! discrete time/elevation domains of a dataset series, fills in default values
//! for unspecified dimensions, and shapes `DescribeEOCoverageSet` results.
//!
//! # Example
//!
//! ```rust
//! use wcs_eo::{DimensionSubset, DimensionSubsetResolver, Domain, DomainValue};
//!
//! let elevations = Domain::new(vec![
//!     DomainValue::Scalar(10.0),
//!     DomainValue::Scalar(20.0),
//!     DomainValue::Scalar(30.0),
//! ]);
//! let subsets = vec![DimensionSubset::slice("elevation", "24")];
//!
//! let resolved = DimensionSubsetResolver::new(&subsets)
//!     .extract_elevation_subset(Some(&elevations))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(resolved.low, 20.0);
//! assert!(resolved.is_degenerate());
//! ```

pub mod axis;
pub mod config;
pub mod coverage_set;
pub mod defaults;
pub mod domain;
pub mod filter;
pub mod granule;
pub mod resolver;
pub mod subset;
pub mod values;

// Re-export commonly used types
pub use axis::{parse_dimension_name, AxisLabelParser};
pub use config::{CoverageConfig, EoConfig};
pub use coverage_set::{CoverageSetDescription, DescribeEoCoverageSetRequest, EoCoverageCodec, Section};
pub use defaults::{CoverageReader, DefaultValuesHelper, GridCoverageRequest};
pub use domain::{Domain, DomainValue, ElevationDomain, ResolvedInterval, Scalar, TimeDomain};
pub use filter::{GranuleFilter, GranuleQuery, GranuleSource, InMemoryGranuleSource};
pub use granule::{AttributeValue, DimensionDescriptor, Granule};
pub use resolver::DimensionSubsetResolver;
pub use subset::DimensionSubset;
pub use values::CustomValue;

pub use wcs_common::{WcsError, WcsResult};
