//! Shared geometry and motion primitives

// core/mod.rs

// Declares the shared geometry and motion primitives used across mowcore: geodetic
// points for geofences and swaths, the odometry integrator, and the local
// dead-reckoning pose. Everything here is plain data or pure math.

pub mod localization;
pub mod odometry;

// Re-export key types so callers don't reach into submodules
pub use localization::LocalPose;
pub use odometry::{integrate_from_ticks, integrate_velocity, PoseDelta, WheelParams};

use serde::{Deserialize, Serialize};

/// Meters spanned by one degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS84 latitude/longitude pair in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (degrees, north positive)
    pub lat: f64,
    /// Longitude (degrees, east positive)
    pub lon: f64,
}

impl GeoPoint {
    /// Point from latitude and longitude in degrees
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        GeoPoint { lat, lon }
    }
}
