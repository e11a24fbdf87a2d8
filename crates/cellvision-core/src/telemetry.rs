//! Numeric results published to the robot controller.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::geometry::Target;
use crate::pipeline::config::{StalePolicy, TelemetryConfig};

/// Key-value store for published numbers.
///
/// Called once per frame from the processing worker; readers may live on
/// other threads.
pub trait TelemetrySink: Send + Sync {
    fn put_number(&self, key: &str, value: f64);

    /// Remove `key` so readers see no value.
    fn delete(&self, key: &str);
}

/// Thread-safe in-memory table, the local stand-in for a network table.
#[derive(Debug, Default)]
pub struct TelemetryTable {
    name: String,
    entries: Mutex<BTreeMap<String, f64>>,
}

impl TelemetryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.lock().get(key).copied()
    }

    /// Copy of every entry, sorted by key.
    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, f64>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TelemetrySink for TelemetryTable {
    fn put_number(&self, key: &str, value: f64) {
        self.lock().insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// Sink that only logs what would be published.
#[derive(Debug, Clone)]
pub struct LogTelemetry {
    table: String,
}

impl LogTelemetry {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl TelemetrySink for LogTelemetry {
    fn put_number(&self, key: &str, value: f64) {
        debug!(table = %self.table, key, value, "telemetry put");
    }

    fn delete(&self, key: &str) {
        debug!(table = %self.table, key, "telemetry delete");
    }
}

/// Fan a frame result out to the configured keys.
pub struct TelemetryPublisher {
    config: TelemetryConfig,
    sink: Arc<dyn TelemetrySink>,
}

impl TelemetryPublisher {
    pub fn new(config: TelemetryConfig, sink: Arc<dyn TelemetrySink>) -> Self {
        Self { config, sink }
    }

    /// Publish a target, or apply the stale policy when there is none.
    pub fn publish(&self, target: Option<&Target>) {
        let c = &self.config;
        match target {
            Some(t) => {
                self.sink.put_number(&c.horizontal_angle_key, t.horizontal_angle);
                self.sink.put_number(&c.vertical_angle_key, t.vertical_angle);
                self.sink.put_number(&c.distance_key, t.distance);
                self.sink.put_number(&c.radius_key, t.candidate.radius);
            }
            None => match c.stale_policy {
                StalePolicy::Hold => {}
                StalePolicy::Invalidate => {
                    for key in [
                        &c.horizontal_angle_key,
                        &c.vertical_angle_key,
                        &c.distance_key,
                        &c.radius_key,
                    ] {
                        self.sink.delete(key);
                    }
                }
            },
        }
    }
}
