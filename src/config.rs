//! YAML configuration for thresholds and robot parameters

// src/config.rs
// Mowcore configuration: every threshold and robot parameter in one YAML file.

// Missing sections and fields fall back to defaults, so an empty document is a
// valid configuration. Validation is explicit and runs at load time; invalid
// values are construction errors, never coerced.

use crate::core::WheelParams;
use crate::readiness::ChargeMonitor;
use crate::weather::{SensorFallbackRules, DEFAULT_TTL_S};
use crate::MowError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Coverage planning parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Blade cutting width (m)
    pub cutting_width_m: f64,
    /// Overlap between neighbouring swaths (m)
    pub overlap_m: f64,
    /// Swath heading (degrees); 0/180 north-south, 90 east-west
    pub heading_deg: f64,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        CoverageConfig {
            cutting_width_m: 0.4,
            overlap_m: 0.04,
            heading_deg: 0.0,
        }
    }
}

/// Return-to-charge thresholds (percent state of charge)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    /// Immediate return below this percent
    pub critical_percent: f64,
    /// Return below this percent
    pub min_percent: f64,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        ChargeConfig {
            critical_percent: 10.0,
            min_percent: 20.0,
        }
    }
}

/// Raw wheel geometry; validated into [`WheelParams`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Wheel radius (m)
    pub radius_m: f64,
    /// Track width (m)
    pub wheel_base_m: f64,
    /// Encoder ticks per revolution
    pub ticks_per_rev: u32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        WheelConfig {
            radius_m: 0.1,
            wheel_base_m: 0.35,
            ticks_per_rev: 1024,
        }
    }
}

/// Weather cache, fallback thresholds and optional forecast source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Forecast cache document
    pub cache_path: PathBuf,
    /// Cache time-to-live (s)
    pub ttl_s: f64,
    /// Sensor fallback thresholds, inline in the `weather` section
    #[serde(flatten)]
    pub rules: SensorFallbackRules,
    /// Forecast document written by an external sync job; none disables the provider
    pub forecast_file: Option<PathBuf>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            cache_path: PathBuf::from("weather_cache.json"),
            ttl_s: DEFAULT_TTL_S,
            rules: SensorFallbackRules::default(),
            forecast_file: None,
        }
    }
}

/// Main configuration structure for mowcore
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MowConfig {
    /// Coverage planning
    pub coverage: CoverageConfig,
    /// Return-to-charge thresholds
    pub charge: ChargeConfig,
    /// Wheel geometry for odometry
    pub wheels: WheelConfig,
    /// Weather gate
    pub weather: WeatherConfig,
}

impl MowConfig {
    /// Loads and validates a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MowError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config: MowConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, MowError> {
        let config: MowConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would silently disable or break a component
    pub fn validate(&self) -> Result<(), MowError> {
        let c = &self.coverage;
        if !(c.overlap_m >= 0.0) || !(c.cutting_width_m > c.overlap_m) || !c.cutting_width_m.is_finite() {
            return Err(MowError::ConfigError(format!(
                "coverage needs finite cutting_width_m > overlap_m >= 0 (got {} / {})",
                c.cutting_width_m, c.overlap_m
            )));
        }
        if !c.heading_deg.is_finite() {
            return Err(MowError::ConfigError(format!(
                "coverage.heading_deg must be finite (got {})",
                c.heading_deg
            )));
        }
        if !(self.weather.ttl_s > 0.0) {
            return Err(MowError::ConfigError(format!(
                "weather.ttl_s must be positive (got {})",
                self.weather.ttl_s
            )));
        }
        self.validate_rules()?;
        self.charge_monitor()?;
        self.wheel_params()?;
        Ok(())
    }

    // NaN thresholds compare false and would switch the sensor gate off
    fn validate_rules(&self) -> Result<(), MowError> {
        let rules = &self.weather.rules;
        let checks = [
            ("max_humidity_percent", Some(rules.max_humidity_percent)),
            ("min_pressure_hpa", Some(rules.min_pressure_hpa)),
            ("min_temperature_c", rules.min_temperature_c),
            ("max_temperature_c", rules.max_temperature_c),
        ];
        for (name, value) in checks {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(MowError::ConfigError(format!("weather.{} must be finite (got {})", name, v)));
            }
        }

        if let (Some(min), Some(max)) = (rules.min_temperature_c, rules.max_temperature_c) {
            if min > max {
                return Err(MowError::ConfigError(format!(
                    "weather.min_temperature_c {} exceeds max_temperature_c {}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Charge monitor from the `charge` section
    pub fn charge_monitor(&self) -> Result<ChargeMonitor, MowError> {
        ChargeMonitor::new(self.charge.critical_percent, self.charge.min_percent)
    }

    /// Validated wheel parameters from the `wheels` section
    pub fn wheel_params(&self) -> Result<WheelParams, MowError> {
        WheelParams::new(self.wheels.radius_m, self.wheels.wheel_base_m, self.wheels.ticks_per_rev)
    }
}
