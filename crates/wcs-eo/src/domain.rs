//! Discrete dimension domains and nearest-neighbour snapping.
//!
//! A domain is the ordered set of values a coverage offers along one dimension:
//! single points, closed ranges, or a mix of both. Slice requests that miss the
//! domain are snapped to the closest available boundary point.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A value type that can appear on a dimension axis.
pub trait Scalar: Copy + std::fmt::Debug {
    /// Signed distance between two values.
    type Distance: PartialOrd + Copy;

    /// Total ordering used for sorting, containment and snapping.
    fn compare(&self, other: &Self) -> Ordering;

    /// `self - earlier`, non-negative whenever `earlier <= self`.
    fn offset_from(&self, earlier: &Self) -> Self::Distance;
}

impl Scalar for DateTime<Utc> {
    type Distance = i64;

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Millisecond resolution.
    fn offset_from(&self, earlier: &Self) -> i64 {
        (*self - *earlier).num_milliseconds()
    }
}

impl Scalar for f64 {
    type Distance = f64;

    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn offset_from(&self, earlier: &Self) -> f64 {
        self - earlier
    }
}

fn le<T: Scalar>(a: &T, b: &T) -> bool {
    a.compare(b) != Ordering::Greater
}

/// One entry of a dimension domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainValue<T> {
    Scalar(T),
    Range { min: T, max: T },
}

impl<T: Scalar> DomainValue<T> {
    /// Build a range, ordering the endpoints.
    pub fn range(a: T, b: T) -> Self {
        if a.compare(&b) == Ordering::Greater {
            DomainValue::Range { min: b, max: a }
        } else {
            DomainValue::Range { min: a, max: b }
        }
    }

    pub fn min(&self) -> T {
        match self {
            DomainValue::Scalar(v) => *v,
            DomainValue::Range { min, .. } => *min,
        }
    }

    pub fn max(&self) -> T {
        match self {
            DomainValue::Scalar(v) => *v,
            DomainValue::Range { max, .. } => *max,
        }
    }

    /// Exact match for scalars, closed-interval containment for ranges.
    pub fn contains(&self, point: &T) -> bool {
        match self {
            DomainValue::Scalar(v) => v.compare(point) == Ordering::Equal,
            DomainValue::Range { min, max } => le(min, point) && le(point, max),
        }
    }

    fn sort_key_cmp(&self, other: &Self) -> Ordering {
        self.min()
            .compare(&other.min())
            .then_with(|| self.max().compare(&other.max()))
            .then_with(|| match (self, other) {
                (DomainValue::Scalar(_), DomainValue::Range { .. }) => Ordering::Less,
                (DomainValue::Range { .. }, DomainValue::Scalar(_)) => Ordering::Greater,
                _ => Ordering::Equal,
            })
    }
}

/// A subset normalized to a closed interval. Slices are degenerate intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedInterval<T> {
    pub low: T,
    pub high: T,
}

impl<T: Scalar> ResolvedInterval<T> {
    pub fn new(low: T, high: T) -> Self {
        Self { low, high }
    }

    pub fn slice(point: T) -> Self {
        Self {
            low: point,
            high: point,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.low.compare(&self.high) == Ordering::Equal
    }
}

/// Ordered, deduplicated domain of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Domain<T> {
    values: Vec<DomainValue<T>>,
}

pub type TimeDomain = Domain<DateTime<Utc>>;
pub type ElevationDomain = Domain<f64>;

impl<T: Scalar> Default for Domain<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T: Scalar> FromIterator<DomainValue<T>> for Domain<T> {
    fn from_iter<I: IntoIterator<Item = DomainValue<T>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T: Scalar> Domain<T> {
    pub fn new<I: IntoIterator<Item = DomainValue<T>>>(values: I) -> Self {
        let mut values: Vec<DomainValue<T>> = values.into_iter().collect();
        values.sort_by(|a, b| a.sort_key_cmp(b));
        values.dedup_by(|a, b| a.sort_key_cmp(b) == Ordering::Equal);
        Self { values }
    }

    /// Domain made of scalar points only.
    pub fn from_points<I: IntoIterator<Item = T>>(points: I) -> Self {
        Self::new(points.into_iter().map(DomainValue::Scalar))
    }

    pub fn values(&self) -> &[DomainValue<T>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ascending, deduplicated boundary points: scalars contribute themselves,
    /// ranges contribute their minimum and maximum.
    pub fn flatten(&self) -> Vec<T> {
        let mut points = Vec::with_capacity(self.values.len() * 2);
        for value in &self.values {
            match value {
                DomainValue::Scalar(v) => points.push(*v),
                DomainValue::Range { min, max } => {
                    points.push(*min);
                    points.push(*max);
                }
            }
        }
        points.sort_by(|a, b| a.compare(b));
        points.dedup_by(|a, b| a.compare(b) == Ordering::Equal);
        points
    }

    /// True if any entry matches the point exactly or contains it as an interval.
    pub fn contains_point(&self, point: &T) -> bool {
        self.values.iter().any(|v| v.contains(point))
    }

    /// Greatest scalar or range maximum.
    pub fn max_value(&self) -> Option<T> {
        self.values
            .iter()
            .map(|v| v.max())
            .max_by(|a, b| a.compare(b))
    }

    /// Smallest scalar or range minimum.
    pub fn min_value(&self) -> Option<T> {
        self.values.first().map(|v| v.min())
    }

    /// Nearest domain point to `point`, or `point` itself if already contained.
    ///
    /// Walks the flattened boundary points in ascending order. The first point
    /// strictly greater than the request is compared with its predecessor and
    /// the strictly closer one wins; ties go to the predecessor. Requests
    /// before the first point snap to it, requests past the last point snap to
    /// the last one. Returns `None` for an empty domain.
    pub fn nearest(&self, point: T) -> Option<T> {
        if self.contains_point(&point) {
            return Some(point);
        }

        let mut previous: Option<T> = None;
        for curr in self.flatten() {
            if curr.compare(&point) != Ordering::Greater {
                previous = Some(curr);
                continue;
            }

            let snapped = match previous {
                None => curr,
                Some(prev) => {
                    let diff_previous = point.offset_from(&prev);
                    let diff_curr = curr.offset_from(&point);
                    if diff_curr < diff_previous {
                        curr
                    } else {
                        prev
                    }
                }
            };
            debug!(requested = ?point, snapped = ?snapped, "Snapped slice point to nearest domain value");
            return Some(snapped);
        }

        if let Some(last) = previous {
            debug!(requested = ?point, snapped = ?last, "Slice point past end of domain, using maximum");
        }
        previous
    }

    /// Snap a slice point, producing a degenerate interval.
    ///
    /// An empty domain offers nothing to snap to and keeps the requested point.
    pub fn snap(&self, point: T) -> ResolvedInterval<T> {
        ResolvedInterval::slice(self.nearest(point).unwrap_or(point))
    }
}
