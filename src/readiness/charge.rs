// readiness/charge.rs

// Battery-driven return-to-charge decisions. Two thresholds, checked critical
// first: below `critical_percent` or below `min_percent` the mower heads for the
// charging station. A missing state-of-charge reading is never read as "fine":
// both `decide` and the scheduler predicate fail closed.

use crate::navigation::WaypointType;
use crate::readiness::Predicate;
use crate::MowError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Outcome of one charge evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChargeDecision {
    /// Abandon the mission and head back
    pub should_return: bool,
    /// Human-readable cause, for logs and operators
    pub reason: String,
    /// Where to go when returning; `None` when continuing
    pub target_waypoint_type: Option<WaypointType>,
}

impl ChargeDecision {
    fn go_charge(reason: String) -> Self {
        ChargeDecision {
            should_return: true,
            reason,
            target_waypoint_type: Some(WaypointType::ChargingStation),
        }
    }
}

/// Threshold-based charge monitor. Holds no state between evaluations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeMonitor {
    critical_percent: f64,
    min_percent: f64,
}

impl ChargeMonitor {
    /// Builds a monitor, requiring `0 < critical_percent <= min_percent <= 100`
    pub fn new(critical_percent: f64, min_percent: f64) -> Result<Self, MowError> {
        let valid = critical_percent > 0.0
            && critical_percent <= min_percent
            && min_percent <= 100.0;
        if !valid {
            return Err(MowError::InvalidChargeThresholds {
                critical: critical_percent,
                min: min_percent,
            });
        }

        Ok(ChargeMonitor { critical_percent, min_percent })
    }

    /// Below this the mower returns immediately
    pub fn critical_percent(&self) -> f64 {
        self.critical_percent
    }

    /// Below this the mower ends the mission and returns
    pub fn min_percent(&self) -> f64 {
        self.min_percent
    }

    /// Decides whether to abandon the mission and return to charge.
    ///
    /// Voltage is accepted for diagnostics only; the decision is made on percent.
    pub fn decide(&self, battery_percent: Option<f64>, battery_voltage: Option<f64>) -> ChargeDecision {
        // NaN counts as unknown
        let decision = match battery_percent.filter(|p| !p.is_nan()) {
            None => ChargeDecision::go_charge("unknown battery percent; conservative return".into()),
            Some(p) if p < self.critical_percent => ChargeDecision::go_charge(format!(
                "battery {:.1}% below critical threshold {:.1}%",
                p, self.critical_percent
            )),
            Some(p) if p < self.min_percent => ChargeDecision::go_charge(format!(
                "battery {:.1}% below minimum threshold {:.1}%",
                p, self.min_percent
            )),
            Some(p) => ChargeDecision {
                should_return: false,
                reason: format!("battery {:.1}% ok", p),
                target_waypoint_type: None,
            },
        };

        if decision.should_return {
            warn!("Return to charge: {} (voltage={:?})", decision.reason, battery_voltage);
        } else {
            debug!("Charge ok: {} (voltage={:?})", decision.reason, battery_voltage);
        }
        decision
    }

    /// Wraps a state-of-charge accessor into the predicate the scheduler polls.
    ///
    /// Fails closed: an absent (or NaN) reading returns `false`. Otherwise
    /// `percent >= min_percent`, with no hysteresis.
    pub fn make_charge_ok_predicate<F>(&self, get_battery_percent: F) -> Predicate
    where
        F: Fn() -> Option<f64> + Send + Sync + 'static,
    {
        let min_percent = self.min_percent;
        Box::new(move || match get_battery_percent() {
            Some(p) => p >= min_percent,
            None => false,
        })
    }
}
