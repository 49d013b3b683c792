//! Mowcore - mission readiness and coverage planning for an autonomous mower
//!
//! This library provides the decision engines an external scheduler polls before
//! and during a mowing mission (safety, charge and weather gates), the coverage
//! planner that turns a geofence into mowing swaths, and a dead-reckoning
//! integrator used when absolute localization is degraded.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod config;
pub mod core;
pub mod navigation;
pub mod readiness;
pub mod weather;

// Re-export commonly used items for easier access
pub use config::MowConfig;
pub use crate::core::{GeoPoint, LocalPose, PoseDelta, WheelParams};
pub use navigation::{CoverageLine, ReturnToHomeAction, WaypointType};
pub use readiness::{ChargeDecision, ChargeMonitor, Predicate, SafetyCheckResult};
pub use weather::{
    EnvSnapshot, FileWeatherCache, Forecast, ForecastCache, SensorFallbackRules,
    WeatherProvider, WeatherService, WeatherSuitability,
};

/// Mowcore error types
///
/// Only configuration problems surface as errors. Missing telemetry, I/O failures
/// and degenerate geometry all resolve to documented safe values instead.
#[derive(Debug, thiserror::Error)]
pub enum MowError {
    /// Charge thresholds violate `0 < critical <= min <= 100`
    #[error("invalid charge thresholds: critical={critical}%, min={min}%")]
    InvalidChargeThresholds {
        /// Configured critical threshold
        critical: f64,
        /// Configured minimum threshold
        min: f64,
    },
    /// Wheel radius, wheel base or encoder resolution is not positive
    #[error("invalid wheel parameter {name}: {value}")]
    InvalidWheelParams {
        /// Offending parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },
    /// Any other rejected configuration value
    #[error("configuration error: {0}")]
    ConfigError(String),
    /// Config file could not be read
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid YAML for [`MowConfig`]
    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
