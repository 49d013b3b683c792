//! Weather gate for mowcore
//!
//! Offline-first suitability: an optional provider is tried first, its result
//! cached on disk with a TTL; without a usable forecast the decision falls back
//! to local sensor readings.
//!
//! Note the asymmetry with the charge gate: the sensor fallback fails open
//! (absent readings count as suitable), while the battery predicate fails closed.

pub mod cache;
pub mod provider;
pub mod sensors;
pub mod service;

pub use cache::{Clock, FileWeatherCache, ForecastCache, MemoryWeatherCache, SystemClock, DEFAULT_TTL_S};
pub use provider::{FileForecastProvider, ProviderError, WeatherProvider};
pub use sensors::SensorFallbackRules;
pub use service::{SuitabilitySource, WeatherService, WeatherSuitability};

use serde::{Deserialize, Serialize};

/// Provider forecast payload. Opaque apart from the optional `unsuitable` flag.
pub type Forecast = serde_json::Map<String, serde_json::Value>;

/// Live environment readings; any sensor may be missing
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvSnapshot {
    /// Air temperature (Celsius)
    pub temperature_c: Option<f64>,
    /// Relative humidity (0-100)
    pub humidity_percent: Option<f64>,
    /// Barometric pressure (hPa)
    pub pressure_hpa: Option<f64>,
}
