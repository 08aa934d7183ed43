//! Generators for synthetic dimension domains and granule indexes.
//!
//! Values are predictable so tests can compute the expected snapping result
//! by hand.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use wcs_common::BoundingBox;

/// `count` instants spaced one day apart starting at `start`.
pub fn daily_times(start: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    (0..count)
        .map(|i| start + Duration::days(i as i64))
        .collect()
}

/// `count` levels `start, start + step, ...`.
pub fn levels(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

/// One granule per (time, elevation) pair, as a JSON array.
///
/// Granule ids are `{prefix}.{time index}.{elevation index}`, the time is
/// stored under `time_attribute`, the elevation under `elevation_attribute`,
/// and every footprint is `footprint`.
pub fn granule_grid_json(
    prefix: &str,
    times: &[DateTime<Utc>],
    time_attribute: &str,
    elevations: &[f64],
    elevation_attribute: &str,
    footprint: BoundingBox,
) -> Value {
    let mut granules = Vec::with_capacity(times.len() * elevations.len().max(1));
    for (ti, t) in times.iter().enumerate() {
        if elevations.is_empty() {
            granules.push(json!({
                "id": format!("{}.{}", prefix, ti),
                "footprint": footprint,
                "attributes": { time_attribute: t.to_rfc3339() },
            }));
            continue;
        }
        for (ei, z) in elevations.iter().enumerate() {
            granules.push(json!({
                "id": format!("{}.{}.{}", prefix, ti, ei),
                "footprint": footprint,
                "attributes": { time_attribute: t.to_rfc3339(), elevation_attribute: z },
            }));
        }
    }
    Value::Array(granules)
}
