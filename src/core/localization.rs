// core/localization.rs

// Local dead-reckoning pose used as a fallback position source while GPS is
// degraded. Accumulates odometry PoseDeltas in a flat east/north frame anchored
// wherever the caller last had a good fix. The integrators in odometry.rs stay
// stateless; this is the caller-side accumulator.

use super::odometry::PoseDelta;
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

/// Position in meters from the anchor plus heading
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LocalPose {
    /// East of anchor (meters)
    pub x_m: f64,
    /// North of anchor (meters)
    pub y_m: f64,
    /// Counter-clockwise from east, normalized to [0, 360)
    pub heading_deg: f64,
}

impl LocalPose {
    /// Pose at the given offset; heading is wrapped into [0, 360)
    pub fn new(x_m: f64, y_m: f64, heading_deg: f64) -> Self {
        LocalPose {
            x_m,
            y_m,
            heading_deg: heading_deg.rem_euclid(360.0),
        }
    }

    /// Applies one motion increment, translating along the midpoint heading of
    /// the interval before rotating.
    pub fn apply(&self, delta: &PoseDelta) -> LocalPose {
        let mid_heading = (self.heading_deg + delta.delta_heading_deg / 2.0).to_radians();
        let step = Rotation2::new(mid_heading) * Vector2::new(delta.distance_m, 0.0);

        LocalPose::new(
            self.x_m + step.x,
            self.y_m + step.y,
            self.heading_deg + delta.delta_heading_deg,
        )
    }

    /// Straight-line distance from the anchor
    pub fn distance_from_anchor(&self) -> f64 {
        Vector2::new(self.x_m, self.y_m).norm()
    }
}


// Weaknesses:
// - Flat-frame accumulation drifts without bound; there is no correction step.
// - Midpoint integration assumes constant curvature within each sample.
