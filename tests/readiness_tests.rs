// Scheduler-style gate evaluation: safety, then charge, then weather

use mowcore::readiness::{validate_pre_job, ChargeMonitor};
use mowcore::weather::{
    Clock, EnvSnapshot, FileWeatherCache, Forecast, ForecastCache, ProviderError, SensorFallbackRules,
    SuitabilitySource, WeatherProvider, WeatherService, DEFAULT_TTL_S,
};
use mowcore::MowConfig;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

mockall::mock! {
    WallClock {}
    impl Clock for WallClock {
        fn now_s(&self) -> f64;
    }
}

fn clock_at(now_s: f64) -> Arc<MockWallClock> {
    let mut clock = MockWallClock::new();
    clock.expect_now_s().return_const(now_s);
    Arc::new(clock)
}

fn forecast(unsuitable: bool) -> Forecast {
    match json!({"unsuitable": unsuitable, "summary": "test"}) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn fair() -> EnvSnapshot {
    EnvSnapshot { temperature_c: Some(20.0), humidity_percent: Some(50.0), pressure_hpa: Some(1012.0) }
}

#[test]
fn estop_reported_even_when_everything_is_wrong() {
    let result = validate_pre_job(|| true, || vec!["blade".to_string()], || false);
    assert!(!result.ok);
    assert_eq!(result.reason.as_deref(), Some("E-stop engaged"));
}

#[test]
fn charge_and_sensor_gates_fail_in_opposite_directions() {
    let monitor = ChargeMonitor::new(10.0, 20.0).unwrap();
    let charge_ok = monitor.make_charge_ok_predicate(|| None);
    assert!(!charge_ok(), "missing battery percent must block");

    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileWeatherCache::new(dir.path().join("w.json"), DEFAULT_TTL_S, clock_at(0.0)));
    let service = Arc::new(WeatherService::new(cache, SensorFallbackRules::new(85.0, 1000.0)));
    let weather_ok = service.make_predicate(0.0, 0.0, EnvSnapshot::default, None);
    assert!(weather_ok(), "missing sensor readings must not block");
}

#[test]
fn fetched_forecast_survives_provider_outage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("weather.json");
    let service = WeatherService::new(
        Arc::new(FileWeatherCache::new(&path, DEFAULT_TTL_S, clock_at(1_000.0))),
        SensorFallbackRules::default(),
    );

    let online = |_: f64, _: f64| -> Result<Option<Forecast>, ProviderError> { Ok(Some(forecast(true))) };
    let first = service.evaluate(37.0, -122.0, &fair(), Some(&online));
    assert!(!first.suitable);
    assert_eq!(first.source, SuitabilitySource::ApiOrCache);

    let offline =
        |_: f64, _: f64| -> Result<Option<Forecast>, ProviderError> { Err(ProviderError::Unavailable("down".into())) };
    let second = service.evaluate(37.0, -122.0, &fair(), Some(&offline));
    assert!(!second.suitable);
    assert_eq!(second.source, SuitabilitySource::ApiOrCache);

    // Same file read later by a fresh cache past the TTL: back to sensors
    let expired = WeatherService::new(
        Arc::new(FileWeatherCache::new(&path, DEFAULT_TTL_S, clock_at(1_000.0 + DEFAULT_TTL_S + 1.0))),
        SensorFallbackRules::default(),
    );
    let third = expired.evaluate(37.0, -122.0, &fair(), Some(&offline));
    assert!(third.suitable);
    assert_eq!(third.source, SuitabilitySource::Sensors);
}

#[test]
fn cache_round_trip_through_trait_object() {
    let dir = TempDir::new().unwrap();
    let cache: Arc<dyn ForecastCache> =
        Arc::new(FileWeatherCache::new(dir.path().join("w.json"), DEFAULT_TTL_S, clock_at(5.0)));

    cache.write(&forecast(false));
    assert_eq!(cache.read(), Some(forecast(false)));
}

struct CountingProvider {
    calls: AtomicUsize,
}

impl WeatherProvider for CountingProvider {
    fn fetch(&self, _lat: f64, _lon: f64) -> Result<Option<Forecast>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(forecast(false)))
    }
}

#[test]
fn predicate_polls_provider_each_call() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(WeatherService::new(
        Arc::new(FileWeatherCache::new(dir.path().join("w.json"), DEFAULT_TTL_S, clock_at(0.0))),
        SensorFallbackRules::default(),
    ));
    let provider = Arc::new(CountingProvider { calls: AtomicUsize::new(0) });

    let predicate = service.make_predicate(0.0, 0.0, fair, Some(provider.clone() as Arc<dyn WeatherProvider>));
    assert!(predicate());
    assert!(predicate());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn config_wires_components() {
    let config = MowConfig::from_yaml("charge:\n  critical_percent: 15\n  min_percent: 25\n").unwrap();
    let monitor = config.charge_monitor().unwrap();

    assert!(monitor.decide(Some(20.0), None).should_return);
    assert!(!monitor.decide(Some(30.0), None).should_return);
}
