use std::collections::HashMap;
use std::sync::RwLock;

use crate::measurement::Measurement;

/// Latest known measurement per sensor serial.
///
/// One writer (the receiver) and many readers (one per adapter plus the
/// accessory protocol's poll path) share this map; the lock guarantees
/// a reader observes either the complete old record or the complete new
/// one, never a partial write. Entries are replaced unconditionally on
/// arrival order and never expire.
#[derive(Debug, Default)]
pub struct MeasurementStore {
    inner: RwLock<HashMap<String, Measurement>>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `measurement` under its own `sensor_id`, replacing any
    /// prior entry for that sensor. No ordering check against
    /// `sensor_time`; the last arrival wins.
    pub fn put(&self, measurement: Measurement) {
        let mut map = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.insert(measurement.sensor_id.clone(), measurement);
    }

    /// Snapshot of the latest measurement for `serial`, if any sensor
    /// with that serial has ever reported.
    pub fn get(&self, serial: &str) -> Option<Measurement> {
        let map = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.get(serial).cloned()
    }

    pub fn len(&self) -> usize {
        let map = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
