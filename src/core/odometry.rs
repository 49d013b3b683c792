// core/odometry.rs

// Dead-reckoning integrator: turns wheel encoder tick deltas or a commanded
// velocity into an incremental pose delta. Both entry points are stateless; the
// caller samples at its own rate and accumulates the absolute pose (see
// localization.rs).
//
// Heading convention: positive delta_heading_deg is a counter-clockwise (left)
// turn, i.e. the right wheel travelled further than the left one.

use crate::MowError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Differential-drive geometry for one robot
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WheelParams {
    radius_m: f64,
    wheel_base_m: f64,
    ticks_per_rev: u32,
}

impl WheelParams {
    /// Validates and builds wheel parameters. All three values must be > 0.
    pub fn new(radius_m: f64, wheel_base_m: f64, ticks_per_rev: u32) -> Result<Self, MowError> {
        // `!(x > 0.0)` also rejects NaN
        if !(radius_m > 0.0) || !radius_m.is_finite() {
            return Err(MowError::InvalidWheelParams { name: "radius_m", value: radius_m });
        }
        if !(wheel_base_m > 0.0) || !wheel_base_m.is_finite() {
            return Err(MowError::InvalidWheelParams {
                name: "wheel_base_m",
                value: wheel_base_m,
            });
        }
        if ticks_per_rev == 0 {
            return Err(MowError::InvalidWheelParams { name: "ticks_per_rev", value: 0.0 });
        }

        Ok(WheelParams { radius_m, wheel_base_m, ticks_per_rev })
    }

    /// Wheel radius (m)
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Track width between wheel contact points (m)
    pub fn wheel_base_m(&self) -> f64 {
        self.wheel_base_m
    }

    /// Encoder ticks per wheel revolution
    pub fn ticks_per_rev(&self) -> u32 {
        self.ticks_per_rev
    }

    /// Arc length travelled by a wheel for the given tick delta
    pub fn arc_length(&self, ticks: i64) -> f64 {
        ticks as f64 / self.ticks_per_rev as f64 * 2.0 * PI * self.radius_m
    }
}

impl<'de> Deserialize<'de> for WheelParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            radius_m: f64,
            wheel_base_m: f64,
            ticks_per_rev: u32,
        }

        let raw = Raw::deserialize(deserializer)?;
        WheelParams::new(raw.radius_m, raw.wheel_base_m, raw.ticks_per_rev)
            .map_err(serde::de::Error::custom)
    }
}

/// Incremental motion estimate, not an absolute pose
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseDelta {
    /// Distance travelled (m); signed from ticks, never negative from velocity
    pub distance_m: f64,
    /// Heading change (degrees); positive is counter-clockwise
    pub delta_heading_deg: f64,
}

/// Differential-drive kinematics over one encoder sampling interval.
///
/// `left_ticks`/`right_ticks` are deltas since the previous sample, not
/// absolute counter values. Reverse motion yields a negative distance.
pub fn integrate_from_ticks(left_ticks: i64, right_ticks: i64, params: &WheelParams) -> PoseDelta {
    let left_arc = params.arc_length(left_ticks);
    let right_arc = params.arc_length(right_ticks);

    let distance_m = (left_arc + right_arc) / 2.0;
    let delta_heading_rad = (right_arc - left_arc) / params.wheel_base_m;

    PoseDelta {
        distance_m,
        delta_heading_deg: delta_heading_rad.to_degrees(),
    }
}

/// Integrates a commanded velocity over `dt_s`.
///
/// Negative linear velocity is clamped to zero distance, so reversing is not
/// represented on this path. Use [`integrate_from_ticks`] when reverse travel
/// matters.
pub fn integrate_velocity(linear_mps: f64, angular_dps: f64, dt_s: f64) -> PoseDelta {
    PoseDelta {
        distance_m: linear_mps.max(0.0) * dt_s,
        delta_heading_deg: angular_dps * dt_s,
    }
}
