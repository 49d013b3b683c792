//! Mission gates: pre-job safety and charge

// readiness/mod.rs

// Go/no-go gates the external scheduler polls before and during a mission:
// the pre-job safety validator (hard gate) and the charge monitor (soft gate,
// triggers a return). The weather gate lives in crate::weather.

pub mod charge;
pub mod safety;

pub use charge::{ChargeDecision, ChargeMonitor};
pub use safety::{validate_pre_job, PreJobValidator, SafetyCheckResult};

/// Zero-argument gate the scheduler polls; `true` means "ok to continue"
pub type Predicate = Box<dyn Fn() -> bool + Send + Sync>;
