// src/navigation/coverage.rs
// Generates parallel mowing swaths over a geofence's bounding box.

// Works directly in latitude/longitude using a flat-earth meters-per-degree scale
// taken once at the bbox midpoint latitude. Only axis-aligned headings are
// planned: 0/180 degrees gives north-south swaths, 90 gives east-west swaths.
// Every other heading yields an empty plan.

use crate::core::{GeoPoint, METERS_PER_DEGREE};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Smallest swath spacing ever used (1 mm)
const MIN_SPACING_M: f64 = 0.001;

/// How close a normalized heading must be to an axis to count as that axis
const HEADING_TOLERANCE_DEG: f64 = 1e-6;

/// One straight mowing swath. Lines are returned in traversal order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoverageLine {
    /// Where the mower enters the swath
    pub start: GeoPoint,
    /// Where the mower leaves the swath
    pub end: GeoPoint,
}

/// Axis-aligned bounding box in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    fn of(polygon: &[GeoPoint]) -> Self {
        polygon.iter().fold(
            BoundingBox {
                min_lat: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
                min_lon: f64::INFINITY,
                max_lon: f64::NEG_INFINITY,
            },
            |bbox, p| BoundingBox {
                min_lat: bbox.min_lat.min(p.lat),
                max_lat: bbox.max_lat.max(p.lat),
                min_lon: bbox.min_lon.min(p.lon),
                max_lon: bbox.max_lon.max(p.lon),
            },
        )
    }

    fn mid_lat(&self) -> f64 {
        (self.min_lat + self.max_lat) / 2.0
    }
}

/// Swath orientation resolved from a heading
#[derive(Clone, Copy, Debug, PartialEq)]
enum SwathAxis {
    NorthSouth,
    EastWest,
}

fn resolve_axis(heading_degrees: f64) -> Option<SwathAxis> {
    if !heading_degrees.is_finite() {
        return None;
    }

    // Mirrored headings describe the same set of lines
    let heading = heading_degrees.rem_euclid(180.0);
    if heading < HEADING_TOLERANCE_DEG || 180.0 - heading < HEADING_TOLERANCE_DEG {
        Some(SwathAxis::NorthSouth)
    } else if (heading - 90.0).abs() < HEADING_TOLERANCE_DEG {
        Some(SwathAxis::EastWest)
    } else {
        None
    }
}

fn distinct_point_count(polygon: &[GeoPoint]) -> usize {
    let mut distinct: Vec<&GeoPoint> = Vec::with_capacity(polygon.len());
    for p in polygon {
        if !distinct.iter().any(|d| *d == p) {
            distinct.push(p);
        }
    }
    distinct.len()
}

/// Plans parallel swaths spaced `cutting_width_m - overlap_m` apart.
///
/// North-south lines run from the bbox south edge to its north edge and are
/// ordered west to east. East-west lines run west to east and are ordered south
/// to north. An empty result means the request cannot be planned: fewer than 3
/// distinct vertices, invalid width/overlap, or a heading other than 0/90/180.
///
/// Spacing uses `111320 * cos(mid_lat)` meters per degree of longitude and a
/// fixed 111320 meters per degree of latitude.
pub fn generate_parallel_lines(
    polygon: &[GeoPoint],
    cutting_width_m: f64,
    overlap_m: f64,
    heading_degrees: f64,
) -> Vec<CoverageLine> {
    if distinct_point_count(polygon) < 3 {
        warn!("Coverage request rejected: geofence needs at least 3 distinct vertices");
        return Vec::new();
    }
    if polygon.iter().any(|p| !p.lat.is_finite() || !p.lon.is_finite()) {
        warn!("Coverage request rejected: geofence has non-finite coordinates");
        return Vec::new();
    }
    if !(overlap_m >= 0.0) || !(cutting_width_m > overlap_m) || !cutting_width_m.is_finite() {
        warn!(
            "Coverage request rejected: width={} overlap={} (need width > overlap >= 0)",
            cutting_width_m, overlap_m
        );
        return Vec::new();
    }

    let Some(axis) = resolve_axis(heading_degrees) else {
        warn!(
            "Coverage request rejected: heading {} is not axis-aligned",
            heading_degrees
        );
        return Vec::new();
    };

    let bbox = BoundingBox::of(polygon);
    let spacing_m = (cutting_width_m - overlap_m).max(MIN_SPACING_M);

    let lines = match axis {
        SwathAxis::NorthSouth => {
            let meters_per_deg_lon = METERS_PER_DEGREE * bbox.mid_lat().to_radians().cos();
            if meters_per_deg_lon <= 0.0 {
                warn!("Coverage request rejected: geofence midpoint is at a pole");
                return Vec::new();
            }
            let d_lon = spacing_m / meters_per_deg_lon;

            offsets(bbox.min_lon, bbox.max_lon, d_lon)
                .map(|lon| CoverageLine {
                    start: GeoPoint::new(bbox.min_lat, lon),
                    end: GeoPoint::new(bbox.max_lat, lon),
                })
                .collect::<Vec<_>>()
        }
        SwathAxis::EastWest => {
            let d_lat = spacing_m / METERS_PER_DEGREE;

            offsets(bbox.min_lat, bbox.max_lat, d_lat)
                .map(|lat| CoverageLine {
                    start: GeoPoint::new(lat, bbox.min_lon),
                    end: GeoPoint::new(lat, bbox.max_lon),
                })
                .collect::<Vec<_>>()
        }
    };

    debug!(
        "Planned {} {:?} swaths at {:.3} m spacing",
        lines.len(),
        axis,
        spacing_m
    );
    lines
}

// Positions min + step/2, min + 3*step/2, ... up to and including max.
// Computed by index so rounding does not accumulate across many swaths.
fn offsets(min: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
    (0u64..)
        .map(move |i| min + step * (i as f64 + 0.5))
        .take_while(move |v| *v <= max)
}


// Weaknesses:
// - Lines cover the bounding box, not the polygon; non-rectangular geofences
//   are over-covered and the motion controller must clip.
// - Spacing is a flat-earth approximation fixed at the midpoint latitude, fine
//   for small fields at mid latitudes, wrong near the poles or across kilometers.
