//! Granule store query model.
//!
//! Resolved subsets are turned into a single combined filter that the granule
//! store evaluates. The in-memory source here is what tests and the CLI use;
//! database-backed stores translate the same filter tree into their own query
//! language.

use std::cmp::Ordering;

use serde::Serialize;
use wcs_common::{BoundingBox, WcsResult};

use crate::granule::{AttributeValue, DimensionDescriptor, Granule};

/// Filter over granule attributes and footprints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GranuleFilter {
    /// Matches everything.
    Include,
    /// `low <= property <= high`
    Between {
        property: String,
        low: AttributeValue,
        high: AttributeValue,
    },
    GreaterOrEqual {
        property: String,
        value: AttributeValue,
    },
    LessOrEqual {
        property: String,
        value: AttributeValue,
    },
    /// Footprint lies entirely within the envelope.
    Within(BoundingBox),
    And(Vec<GranuleFilter>),
}

impl GranuleFilter {
    /// Combine filters; `Include` members are dropped and trivial
    /// conjunctions collapse.
    pub fn and(filters: Vec<GranuleFilter>) -> GranuleFilter {
        let mut filters: Vec<GranuleFilter> = filters
            .into_iter()
            .filter(|f| *f != GranuleFilter::Include)
            .collect();
        match filters.len() {
            0 => GranuleFilter::Include,
            1 => filters.remove(0),
            _ => GranuleFilter::And(filters),
        }
    }

    /// Filter selecting the granules whose dimension values lie within
    /// `[low, high]`.
    ///
    /// Single-valued dimensions use a between test on the start attribute;
    /// ranged ones require `start >= low` and `end <= high`.
    pub fn dimension(
        descriptor: &DimensionDescriptor,
        low: impl Into<AttributeValue>,
        high: impl Into<AttributeValue>,
    ) -> GranuleFilter {
        let low = low.into();
        let high = high.into();
        match &descriptor.end_attribute {
            None => GranuleFilter::Between {
                property: descriptor.start_attribute.clone(),
                low,
                high,
            },
            Some(end) => GranuleFilter::And(vec![
                GranuleFilter::GreaterOrEqual {
                    property: descriptor.start_attribute.clone(),
                    value: low,
                },
                GranuleFilter::LessOrEqual {
                    property: end.clone(),
                    value: high,
                },
            ]),
        }
    }

    pub fn evaluate(&self, granule: &Granule) -> bool {
        match self {
            GranuleFilter::Include => true,
            GranuleFilter::Between {
                property,
                low,
                high,
            } => granule.attribute(property).is_some_and(|v| {
                matches!(v.compare(low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(v.compare(high), Some(Ordering::Less | Ordering::Equal))
            }),
            GranuleFilter::GreaterOrEqual { property, value } => granule
                .attribute(property)
                .is_some_and(|v| matches!(v.compare(value), Some(Ordering::Greater | Ordering::Equal))),
            GranuleFilter::LessOrEqual { property, value } => granule
                .attribute(property)
                .is_some_and(|v| matches!(v.compare(value), Some(Ordering::Less | Ordering::Equal))),
            GranuleFilter::Within(envelope) => granule
                .footprint
                .is_some_and(|footprint| envelope.contains(&footprint)),
            GranuleFilter::And(filters) => filters.iter().all(|f| f.evaluate(granule)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortBy {
    pub property: String,
    pub order: SortOrder,
}

impl SortBy {
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            order: SortOrder::Descending,
        }
    }

    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            order: SortOrder::Ascending,
        }
    }
}

/// A granule query: filter, sort keys, optional result cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GranuleQuery {
    pub filter: GranuleFilter,
    pub sort_by: Vec<SortBy>,
    pub max_features: Option<usize>,
}

impl Default for GranuleQuery {
    fn default() -> Self {
        Self::all()
    }
}

impl GranuleQuery {
    /// Every granule, in store order.
    pub fn all() -> Self {
        Self {
            filter: GranuleFilter::Include,
            sort_by: Vec::new(),
            max_features: None,
        }
    }

    pub fn with_filter(filter: GranuleFilter) -> Self {
        Self {
            filter,
            ..Self::all()
        }
    }
}

/// Access to the granule index of one coverage.
pub trait GranuleSource {
    fn granules(&self, query: &GranuleQuery) -> WcsResult<Vec<Granule>>;

    fn count(&self, query: &GranuleQuery) -> WcsResult<usize> {
        Ok(self.granules(query)?.len())
    }
}

/// Granule index held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGranuleSource {
    granules: Vec<Granule>,
}

impl InMemoryGranuleSource {
    pub fn new(granules: Vec<Granule>) -> Self {
        Self { granules }
    }

    pub fn all(&self) -> &[Granule] {
        &self.granules
    }
}

/// Granules missing a sort attribute go last in either order.
fn compare_by(a: &Granule, b: &Granule, sort: &SortBy) -> Ordering {
    match (a.attribute(&sort.property), b.attribute(&sort.property)) {
        (Some(x), Some(y)) => {
            let ord = x.compare(y).unwrap_or(Ordering::Equal);
            match sort.order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl GranuleSource for InMemoryGranuleSource {
    fn granules(&self, query: &GranuleQuery) -> WcsResult<Vec<Granule>> {
        let mut result: Vec<Granule> = self
            .granules
            .iter()
            .filter(|g| query.filter.evaluate(g))
            .cloned()
            .collect();

        if !query.sort_by.is_empty() {
            result.sort_by(|a, b| {
                query
                    .sort_by
                    .iter()
                    .map(|s| compare_by(a, b, s))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        if let Some(max) = query.max_features {
            result.truncate(max);
        }
        Ok(result)
    }
}
