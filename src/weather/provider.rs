// weather/provider.rs

// Optional external forecast source. The core never owns network I/O or its
// timeout/retry policy: a provider is any WeatherProvider the caller wires in,
// including a plain closure. FileForecastProvider reads a forecast document
// dropped on disk by a separate sync process.

use super::Forecast;
use log::debug;
use std::fs;
use std::path::PathBuf;

/// Why a provider produced no forecast
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Upstream unreachable, timed out, or disabled
    #[error("weather provider unavailable: {0}")]
    Unavailable(String),
    /// Local read failed
    #[error("weather provider I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Payload was not a JSON object
    #[error("malformed forecast: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Source of forecasts for a location
///
/// Failures should come back as `Err`. The weather service also catches a
/// panic from `fetch` and treats it the same way.
#[cfg_attr(test, mockall::automock)]
pub trait WeatherProvider: Send + Sync {
    /// `Ok(None)` means the provider answered but had nothing for this location
    fn fetch(&self, lat: f64, lon: f64) -> Result<Option<Forecast>, ProviderError>;
}

impl<F> WeatherProvider for F
where
    F: Fn(f64, f64) -> Result<Option<Forecast>, ProviderError> + Send + Sync,
{
    fn fetch(&self, lat: f64, lon: f64) -> Result<Option<Forecast>, ProviderError> {
        self(lat, lon)
    }
}

/// Reads a single forecast JSON object from a file, ignoring location
pub struct FileForecastProvider {
    path: PathBuf,
}

impl FileForecastProvider {
    /// Provider reading the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileForecastProvider { path: path.into() }
    }
}

impl WeatherProvider for FileForecastProvider {
    fn fetch(&self, lat: f64, lon: f64) -> Result<Option<Forecast>, ProviderError> {
        debug!("Reading forecast for ({}, {}) from {}", lat, lon, self.path.display());
        let raw = fs::read_to_string(&self.path)?;
        let forecast: Forecast = serde_json::from_str(&raw)?;
        Ok(Some(forecast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn closures_are_providers() {
        let provider = |_lat: f64, _lon: f64| -> Result<Option<Forecast>, ProviderError> {
            Err(ProviderError::Unavailable("offline".into()))
        };
        assert!(matches!(provider.fetch(1.0, 2.0), Err(ProviderError::Unavailable(_))));
    }

    #[test]
    fn file_provider_reads_object() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{"unsuitable": true, "summary": "storm"}"#).unwrap();

        let forecast = FileForecastProvider::new(file.path()).fetch(0.0, 0.0).unwrap().unwrap();
        assert_eq!(forecast["summary"], "storm");
    }

    #[test]
    fn file_provider_errors() {
        let missing = FileForecastProvider::new("/nonexistent/mowcore/forecast.json");
        assert!(matches!(missing.fetch(0.0, 0.0), Err(ProviderError::Io(_))));

        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[]").unwrap();
        let provider = FileForecastProvider::new(file.path());
        assert!(matches!(provider.fetch(0.0, 0.0), Err(ProviderError::Malformed(_))));
    }
}
