// weather/service.rs

// Weather suitability service: provider first (only when one is wired in),
// then the cache, then local sensors. Provider errors and cache problems are
// absorbed here and never reach the scheduler.

use super::{EnvSnapshot, Forecast, ForecastCache, ProviderError, SensorFallbackRules, WeatherProvider};
use crate::readiness::Predicate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, TryLockError};

// A panicking provider is treated like one that returned Err
fn fetch_guarded(provider: &dyn WeatherProvider, lat: f64, lon: f64) -> Result<Option<Forecast>, ProviderError> {
    panic::catch_unwind(AssertUnwindSafe(|| provider.fetch(lat, lon))).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(ProviderError::Unavailable(format!("provider panicked: {}", msg)))
    })
}

/// Where a suitability verdict came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitabilitySource {
    /// Fresh provider forecast or a cached one
    ApiOrCache,
    /// Local sensor fallback rules
    Sensors,
}

/// Weather gate verdict
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSuitability {
    /// Ok to mow
    pub suitable: bool,
    /// Which path decided
    pub source: SuitabilitySource,
    /// Forecast or sensor readings behind the verdict
    pub details: Map<String, Value>,
}

// Truthiness of the forecast's `unsuitable` flag: null, false, 0, "" and
// empty containers are falsy.
fn flag_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Composes a forecast cache, sensor fallback rules and an optional provider
pub struct WeatherService {
    cache: Arc<dyn ForecastCache>,
    rules: SensorFallbackRules,
    // Held for the duration of a provider fetch + cache write
    fetch_lock: Mutex<()>,
}

impl WeatherService {
    /// Service over an injected cache and fallback rules
    pub fn new(cache: Arc<dyn ForecastCache>, rules: SensorFallbackRules) -> Self {
        WeatherService {
            cache,
            rules,
            fetch_lock: Mutex::new(()),
        }
    }

    /// Sensor fallback thresholds in use
    pub fn rules(&self) -> &SensorFallbackRules {
        &self.rules
    }

    /// Fetches from the provider when one is supplied, caching any result.
    /// Falls back to the cache when the provider is absent, fails, returns
    /// nothing, or another caller is already mid-fetch.
    pub fn get_forecast(&self, lat: f64, lon: f64, provider: Option<&dyn WeatherProvider>) -> Option<Forecast> {
        if let Some(provider) = provider {
            let guard = match self.fetch_lock.try_lock() {
                Ok(guard) => Some(guard),
                Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => None,
            };

            match guard {
                Some(_guard) => match fetch_guarded(provider, lat, lon) {
                    Ok(Some(forecast)) => {
                        self.cache.write(&forecast);
                        return Some(forecast);
                    }
                    Ok(None) => debug!("Weather provider had no forecast for ({}, {})", lat, lon),
                    Err(e) => warn!("Weather provider failed, using cache: {}", e),
                },
                None => debug!("Forecast fetch already in flight, reading cache"),
            }
        }

        self.cache.read()
    }

    /// Suitability from the forecast if there is one, else from sensors
    pub fn evaluate(
        &self,
        lat: f64,
        lon: f64,
        env: &EnvSnapshot,
        provider: Option<&dyn WeatherProvider>,
    ) -> WeatherSuitability {
        if let Some(forecast) = self.get_forecast(lat, lon, provider) {
            let unsuitable = flag_set(forecast.get("unsuitable"));
            if unsuitable {
                warn!("Forecast marks ({}, {}) unsuitable for mowing", lat, lon);
            }

            let mut details = Map::new();
            details.insert("unsuitable".into(), Value::Bool(unsuitable));
            details.insert("forecast".into(), Value::Object(forecast));
            return WeatherSuitability {
                suitable: !unsuitable,
                source: SuitabilitySource::ApiOrCache,
                details,
            };
        }

        let violation = self.rules.violation(env);
        match &violation {
            Some(reason) => warn!("No forecast; sensors unsuitable: {}", reason),
            None => info!("No forecast; sensors within limits"),
        }

        let mut details = Map::new();
        details.insert("temperature_c".into(), json!(env.temperature_c));
        details.insert("humidity_percent".into(), json!(env.humidity_percent));
        details.insert("pressure_hpa".into(), json!(env.pressure_hpa));
        details.insert("max_humidity_percent".into(), json!(self.rules.max_humidity_percent));
        details.insert("min_pressure_hpa".into(), json!(self.rules.min_pressure_hpa));
        if let Some(reason) = &violation {
            details.insert("violation".into(), json!(reason));
        }

        WeatherSuitability {
            suitable: violation.is_none(),
            source: SuitabilitySource::Sensors,
            details,
        }
    }

    /// Weather gate for the scheduler. Samples the environment on every call.
    pub fn make_predicate<S>(
        self: &Arc<Self>,
        lat: f64,
        lon: f64,
        env_supplier: S,
        provider: Option<Arc<dyn WeatherProvider>>,
    ) -> Predicate
    where
        S: Fn() -> EnvSnapshot + Send + Sync + 'static,
    {
        let service = Arc::clone(self);
        Box::new(move || {
            let env = env_supplier();
            service.evaluate(lat, lon, &env, provider.as_deref()).suitable
        })
    }
}
