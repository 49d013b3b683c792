// weather/cache.rs

// Forecast cache with a time-to-live. FileWeatherCache owns one JSON document
// `{"timestamp_s": <f64>, "forecast": {...}}` and replaces it atomically (temp
// file + rename) so readers see either the old or the new entry, never a torn
// one. Every failure stays inside this module: a bad read is a miss, a bad
// write is logged and dropped.

use super::Forecast;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Six hours
pub const DEFAULT_TTL_S: f64 = 21_600.0;

// Process-wide, so separate cache instances on one path never share a temp file
static TEMP_FILE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Wall-clock source in seconds since the Unix epoch
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch
    fn now_s(&self) -> f64;
}

/// System wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_s(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Read/write seam for the forecast cache
#[cfg_attr(test, mockall::automock)]
pub trait ForecastCache: Send + Sync {
    /// Fresh forecast, or `None` on miss, corruption or expiry
    fn read(&self) -> Option<Forecast>;
    /// Stores a forecast stamped with the current time. Never fails.
    fn write(&self, forecast: &Forecast);
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    timestamp_s: f64,
    forecast: Forecast,
}

#[derive(Debug, thiserror::Error)]
enum CacheError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cache path {0:?} has no file name")]
    BadPath(PathBuf),
}

// Entries stamped in the future (clock step backwards) are kept; only age
// beyond the TTL expires an entry.
fn is_fresh(timestamp_s: f64, now_s: f64, ttl_s: f64) -> bool {
    timestamp_s.is_finite() && now_s - timestamp_s <= ttl_s
}

/// Single-file forecast cache. No other process may write to `path`; several
/// instances in one process may share it, each write lands whole.
pub struct FileWeatherCache {
    path: PathBuf,
    ttl_s: f64,
    clock: Arc<dyn Clock>,
    // Serializes writers inside this process; rename keeps readers safe
    write_lock: Mutex<()>,
}

impl FileWeatherCache {
    /// Cache file at `path`, entries expiring after `ttl_s` seconds
    pub fn new(path: impl Into<PathBuf>, ttl_s: f64, clock: Arc<dyn Clock>) -> Self {
        FileWeatherCache {
            path: path.into(),
            ttl_s,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Cache at `path` with the default TTL and the system clock
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        Self::new(path, DEFAULT_TTL_S, Arc::new(SystemClock))
    }

    /// Location of the cache document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_read(&self) -> Result<CacheEntry, CacheError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn try_write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| CacheError::BadPath(self.path.clone()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = file_name.to_os_string();
        let seq = TEMP_FILE_SEQ.fetch_add(1, Ordering::Relaxed);
        tmp_name.push(format!(".{}.{}.tmp", std::process::id(), seq));
        let tmp_path = self.path.with_file_name(tmp_name);

        let result = (|| -> Result<(), CacheError> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&serde_json::to_vec(entry)?)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

impl ForecastCache for FileWeatherCache {
    fn read(&self) -> Option<Forecast> {
        let entry = match self.try_read() {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Weather cache miss at {}: {}", self.path.display(), e);
                return None;
            }
        };

        let now_s = self.clock.now_s();
        if !is_fresh(entry.timestamp_s, now_s, self.ttl_s) {
            debug!(
                "Weather cache expired ({:.0}s old, ttl {:.0}s)",
                now_s - entry.timestamp_s,
                self.ttl_s
            );
            return None;
        }
        Some(entry.forecast)
    }

    fn write(&self, forecast: &Forecast) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = CacheEntry {
            timestamp_s: self.clock.now_s(),
            forecast: forecast.clone(),
        };

        match self.try_write(&entry) {
            Ok(()) => debug!("Cached forecast at {}", self.path.display()),
            Err(e) => warn!("Failed to write weather cache {}: {}", self.path.display(), e),
        }
    }
}

/// In-process cache with the same TTL rules, for deployments without a
/// writable disk
pub struct MemoryWeatherCache {
    ttl_s: f64,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<CacheEntry>>,
}

impl MemoryWeatherCache {
    /// Empty cache, entries expiring after `ttl_s` seconds
    pub fn new(ttl_s: f64, clock: Arc<dyn Clock>) -> Self {
        MemoryWeatherCache {
            ttl_s,
            clock,
            entry: RwLock::new(None),
        }
    }
}

impl ForecastCache for MemoryWeatherCache {
    fn read(&self) -> Option<Forecast> {
        let guard = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|e| is_fresh(e.timestamp_s, self.clock.now_s(), self.ttl_s))
            .map(|e| e.forecast.clone())
    }

    fn write(&self, forecast: &Forecast) {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *entry = Some(CacheEntry {
            timestamp_s: self.clock.now_s(),
            forecast: forecast.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    // Settable clock, stored as f64 bits
    struct TestClock(AtomicU64);

    impl TestClock {
        fn at(now_s: f64) -> Arc<Self> {
            Arc::new(TestClock(AtomicU64::new(now_s.to_bits())))
        }

        fn set(&self, now_s: f64) {
            self.0.store(now_s.to_bits(), Ordering::SeqCst);
        }
    }

    impl Clock for TestClock {
        fn now_s(&self) -> f64 {
            f64::from_bits(self.0.load(Ordering::SeqCst))
        }
    }

    fn forecast() -> Forecast {
        match json!({"unsuitable": false, "rain_mm": 0.2, "hourly": [1, 2, 3]}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn round_trip_within_ttl() {
        let dir = TempDir::new().unwrap();
        let clock = TestClock::at(1_000_000.0);
        let cache = FileWeatherCache::new(dir.path().join("weather.json"), DEFAULT_TTL_S, clock.clone());

        cache.write(&forecast());
        clock.set(1_000_000.0 + DEFAULT_TTL_S);
        assert_eq!(cache.read(), Some(forecast()));

        clock.set(1_000_000.0 + DEFAULT_TTL_S + 1.0);
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn aged_entry_on_disk_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weather.json");
        let aged = json!({"timestamp_s": 0.0, "forecast": {"unsuitable": true}});
        fs::write(&path, aged.to_string()).unwrap();

        let cache = FileWeatherCache::new(&path, DEFAULT_TTL_S, TestClock::at(DEFAULT_TTL_S * 2.0));
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn missing_and_corrupt_files_are_misses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weather.json");
        let cache = FileWeatherCache::new(&path, DEFAULT_TTL_S, TestClock::at(10.0));
        assert_eq!(cache.read(), None);

        fs::write(&path, "{\"timestamp_s\": 5.0, \"forec").unwrap();
        assert_eq!(cache.read(), None);

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn write_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache").join("weather.json");
        let cache = FileWeatherCache::new(&path, DEFAULT_TTL_S, TestClock::at(10.0));

        cache.write(&forecast());
        assert!(path.exists());

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let on_disk: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["timestamp_s"], json!(10.0));
        assert_eq!(on_disk["forecast"]["rain_mm"], json!(0.2));
    }

    #[test]
    fn write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so create_dir_all fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let cache = FileWeatherCache::new(blocker.join("weather.json"), DEFAULT_TTL_S, TestClock::at(10.0));

        cache.write(&forecast());
        assert_eq!(cache.read(), None);
    }

    #[test]
    fn overwrite_replaces_entry() {
        let dir = TempDir::new().unwrap();
        let clock = TestClock::at(100.0);
        let cache = FileWeatherCache::new(dir.path().join("w.json"), 60.0, clock.clone());

        cache.write(&forecast());
        clock.set(200.0);
        let mut newer = forecast();
        newer.insert("unsuitable".into(), json!(true));
        cache.write(&newer);

        assert_eq!(cache.read(), Some(newer));
    }

    #[test]
    fn concurrent_readers_never_see_torn_writes() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(FileWeatherCache::new(
            dir.path().join("w.json"),
            DEFAULT_TTL_S,
            TestClock::at(10.0),
        ));
        cache.write(&forecast());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        if i % 2 == 0 {
                            cache.write(&forecast());
                        } else {
                            assert_eq!(cache.read(), Some(forecast()));
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn instances_sharing_a_path_never_publish_partial_documents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared.json");
        let small = forecast();
        let mut large = forecast();
        large.insert("hourly".into(), json!(vec![0.5_f64; 4096]));

        let writers: Vec<_> = [small.clone(), large.clone()]
            .into_iter()
            .map(|payload| {
                let cache = FileWeatherCache::new(&path, DEFAULT_TTL_S, TestClock::at(10.0));
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        cache.write(&payload);
                    }
                })
            })
            .collect();

        let reader = FileWeatherCache::new(&path, DEFAULT_TTL_S, TestClock::at(10.0));
        for _ in 0..200 {
            if let Some(seen) = reader.read() {
                assert!(seen == small || seen == large);
            }
        }
        for writer in writers {
            writer.join().unwrap();
        }

        let last = reader.read().unwrap();
        assert!(last == small || last == large);
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn memory_cache_honours_ttl() {
        let mut clock = MockClock::new();
        let now = Arc::new(AtomicU64::new(0.0_f64.to_bits()));
        let source = Arc::clone(&now);
        clock
            .expect_now_s()
            .returning(move || f64::from_bits(source.load(Ordering::SeqCst)));

        let cache = MemoryWeatherCache::new(30.0, Arc::new(clock));
        assert_eq!(cache.read(), None);

        cache.write(&forecast());
        now.store(30.0_f64.to_bits(), Ordering::SeqCst);
        assert_eq!(cache.read(), Some(forecast()));

        now.store(31.0_f64.to_bits(), Ordering::SeqCst);
        assert_eq!(cache.read(), None);
    }
}
