// readiness/safety.rs

// Pre-mission hard gate. Aggregates e-stop, interlock and GPS status through
// caller-supplied accessors; this module never touches hardware itself.
// Checks run in a fixed order and stop at the first failure, so an engaged
// e-stop is always the reported reason when it is active.

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Outcome of a pre-job safety check
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyCheckResult {
    /// All checks passed
    pub ok: bool,
    /// First failing check, when not ok
    pub reason: Option<String>,
}

impl SafetyCheckResult {
    /// Passing result
    pub fn pass() -> Self {
        SafetyCheckResult { ok: true, reason: None }
    }

    /// Failing result with a reason
    pub fn fail(reason: impl Into<String>) -> Self {
        SafetyCheckResult { ok: false, reason: Some(reason.into()) }
    }
}

/// Runs the pre-job checks: e-stop, then interlocks, then GPS.
///
/// Later accessors are not called once an earlier check fails.
pub fn validate_pre_job<E, I, G>(estop_engaged: E, active_interlocks: I, gps_available: G) -> SafetyCheckResult
where
    E: FnOnce() -> bool,
    I: FnOnce() -> Vec<String>,
    G: FnOnce() -> bool,
{
    let result = if estop_engaged() {
        SafetyCheckResult::fail("E-stop engaged")
    } else {
        let interlocks = active_interlocks();
        if !interlocks.is_empty() {
            SafetyCheckResult::fail(format!("Active interlocks: {}", interlocks.join(", ")))
        } else if !gps_available() {
            SafetyCheckResult::fail("GPS unavailable")
        } else {
            SafetyCheckResult::pass()
        }
    };

    match &result.reason {
        Some(reason) => warn!("Pre-job safety check failed: {}", reason),
        None => info!("Pre-job safety check passed"),
    }
    result
}

type Accessor<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Holds the three status accessors so the same check can be re-run
pub struct PreJobValidator {
    estop_engaged: Accessor<bool>,
    active_interlocks: Accessor<Vec<String>>,
    gps_available: Accessor<bool>,
}

impl PreJobValidator {
    /// Validator over caller-owned status accessors
    pub fn new<E, I, G>(estop_engaged: E, active_interlocks: I, gps_available: G) -> Self
    where
        E: Fn() -> bool + Send + Sync + 'static,
        I: Fn() -> Vec<String> + Send + Sync + 'static,
        G: Fn() -> bool + Send + Sync + 'static,
    {
        PreJobValidator {
            estop_engaged: Box::new(estop_engaged),
            active_interlocks: Box::new(active_interlocks),
            gps_available: Box::new(gps_available),
        }
    }

    /// Runs [`validate_pre_job`] against the stored accessors
    pub fn validate(&self) -> SafetyCheckResult {
        validate_pre_job(
            || (self.estop_engaged)(),
            || (self.active_interlocks)(),
            || (self.gps_available)(),
        )
    }
}
