// weather/sensors.rs

// Local sensor fallback used when no forecast is available at all. Fails open:
// a missing reading never blocks the mission, only a present reading that
// crosses its threshold does. By the time this runs the network path has
// already failed, so absent sensors must not compound into a total denial.

use super::EnvSnapshot;
use serde::{Deserialize, Serialize};

/// Thresholds for the sensor fallback; temperature bounds are off by default
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorFallbackRules {
    /// Humidity above this is unsuitable
    pub max_humidity_percent: f64,
    /// Pressure below this is unsuitable
    pub min_pressure_hpa: f64,
    /// Optional lower temperature bound (Celsius)
    pub min_temperature_c: Option<f64>,
    /// Optional upper temperature bound (Celsius)
    pub max_temperature_c: Option<f64>,
}

impl Default for SensorFallbackRules {
    fn default() -> Self {
        SensorFallbackRules {
            max_humidity_percent: 85.0,
            min_pressure_hpa: 1000.0,
            min_temperature_c: None,
            max_temperature_c: None,
        }
    }
}

impl SensorFallbackRules {
    /// Humidity/pressure rules with temperature checks disabled
    pub fn new(max_humidity_percent: f64, min_pressure_hpa: f64) -> Self {
        SensorFallbackRules {
            max_humidity_percent,
            min_pressure_hpa,
            ..Default::default()
        }
    }

    /// Sets or clears the temperature bounds
    pub fn with_temperature_bounds(mut self, min_c: Option<f64>, max_c: Option<f64>) -> Self {
        self.min_temperature_c = min_c;
        self.max_temperature_c = max_c;
        self
    }

    /// First rule the snapshot breaks, if any
    pub fn violation(&self, env: &EnvSnapshot) -> Option<String> {
        if let Some(h) = env.humidity_percent.filter(|h| *h > self.max_humidity_percent) {
            return Some(format!("humidity {:.1}% > {:.1}%", h, self.max_humidity_percent));
        }
        if let Some(p) = env.pressure_hpa.filter(|p| *p < self.min_pressure_hpa) {
            return Some(format!("pressure {:.1} hPa < {:.1} hPa", p, self.min_pressure_hpa));
        }
        if let (Some(t), Some(min)) = (env.temperature_c, self.min_temperature_c) {
            if t < min {
                return Some(format!("temperature {:.1}C < {:.1}C", t, min));
            }
        }
        if let (Some(t), Some(max)) = (env.temperature_c, self.max_temperature_c) {
            if t > max {
                return Some(format!("temperature {:.1}C > {:.1}C", t, max));
            }
        }
        None
    }

    /// `true` unless a present reading breaks a rule
    pub fn is_suitable(&self, env: &EnvSnapshot) -> bool {
        self.violation(env).is_none()
    }
}
