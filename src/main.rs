// src/main.rs
// Demo readiness cycle: evaluates the mission gates in scheduler order against
// simulated telemetry, plans coverage for a sample geofence, and dead-reckons a
// short drive along the first swath.

use log::{error, info, warn};
use mowcore::core::{integrate_from_ticks, integrate_velocity, LocalPose};
use mowcore::navigation::{generate_parallel_lines, make_action};
use mowcore::readiness::validate_pre_job;
use mowcore::weather::{
    EnvSnapshot, FileForecastProvider, FileWeatherCache, SystemClock, WeatherProvider, WeatherService,
};
use mowcore::{GeoPoint, MowConfig};
use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Runs a few scheduler cycles with a draining battery
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    info!("Starting mowcore readiness demo...");

    let config = match std::env::args().nth(1) {
        Some(path) => MowConfig::load(path)?,
        None => {
            info!("No config path given, using defaults");
            MowConfig::default()
        }
    };

    let charge_monitor = config.charge_monitor()?;
    let wheels = config.wheel_params()?;

    let cache = Arc::new(FileWeatherCache::new(
        &config.weather.cache_path,
        config.weather.ttl_s,
        Arc::new(SystemClock),
    ));
    let weather = Arc::new(WeatherService::new(cache, config.weather.rules));
    let provider: Option<Arc<dyn WeatherProvider>> = config
        .weather
        .forecast_file
        .as_ref()
        .map(|path| Arc::new(FileForecastProvider::new(path)) as Arc<dyn WeatherProvider>);

    // Simulated telemetry: battery drains 8% per cycle, stored as tenths of a percent
    let battery_tenths = Arc::new(AtomicU32::new(320));
    let battery_source = Arc::clone(&battery_tenths);
    let charge_ok = charge_monitor
        .make_charge_ok_predicate(move || Some(battery_source.load(Ordering::SeqCst) as f64 / 10.0));

    let home = GeoPoint::new(37.0, -122.0);
    let weather_ok = weather.make_predicate(
        home.lat,
        home.lon,
        || EnvSnapshot {
            temperature_c: Some(19.5),
            humidity_percent: Some(62.0),
            pressure_hpa: Some(1013.0),
        },
        provider,
    );

    let geofence = vec![
        GeoPoint::new(37.0005, -122.0005),
        GeoPoint::new(37.0005, -121.9995),
        GeoPoint::new(36.9995, -121.9995),
        GeoPoint::new(36.9995, -122.0005),
    ];

    for cycle in 0..3 {
        info!("Readiness cycle {}", cycle);

        // Hard gate
        let safety = validate_pre_job(|| false, Vec::new, || true);
        if !safety.ok {
            error!("Mission blocked: {:?}", safety.reason);
            break;
        }

        // Soft gates
        if !charge_ok() {
            let percent = battery_tenths.load(Ordering::SeqCst) as f64 / 10.0;
            let decision = charge_monitor.decide(Some(percent), None);
            warn!("Charge gate closed: {}", decision.reason);
            info!("Dispatching {}", serde_json::to_string(&make_action())?);
            break;
        }
        if !weather_ok() {
            warn!("Weather gate closed, deferring mission");
            break;
        }

        let lines = generate_parallel_lines(
            &geofence,
            config.coverage.cutting_width_m,
            config.coverage.overlap_m,
            config.coverage.heading_deg,
        );
        if lines.is_empty() {
            error!("Coverage request could not be planned");
            break;
        }
        info!(
            "Planned {} swaths, first: {:?} -> {:?}",
            lines.len(),
            lines[0].start,
            lines[0].end
        );

        // Dead reckoning along the first swath while GPS is degraded
        let mut pose = LocalPose::new(0.0, 0.0, 90.0);
        for _ in 0..10 {
            pose = pose.apply(&integrate_from_ticks(512, 512, &wheels));
        }
        pose = pose.apply(&integrate_velocity(0.3, 0.0, 2.0));
        info!(
            "Dead-reckoned pose: x={:.2} m, y={:.2} m, heading={:.1} deg",
            pose.x_m, pose.y_m, pose.heading_deg
        );

        battery_tenths.fetch_sub(80, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(200));
    }

    info!("Mowcore demo completed");
    Ok(())
}
