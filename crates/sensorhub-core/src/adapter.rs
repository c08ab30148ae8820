use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::store::MeasurementStore;

/// Static identity of one configured sensor. `serial` must equal the
/// `sensor_id` the sensor puts on the wire; it is the join key into the
/// measurement store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub serial: String,
    pub name: String,
    pub model: String,
}

/// Accessory-protocol view of one sensor, recomputed on every
/// resolution and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorState {
    pub value: f32,
    pub active: bool,
    pub fault: bool,
}

/// One proactive value propagation from a push task to the accessory
/// transport.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorUpdate {
    pub serial: String,
    pub state: SensorState,
}

/// Per-sensor translation unit between the measurement store and the
/// accessory protocol. Read-only over the store; the receiver is the
/// sole writer.
#[derive(Debug, Clone)]
pub struct SensorAdapter {
    config: SensorConfig,
    store: Arc<MeasurementStore>,
}

impl SensorAdapter {
    pub fn new(config: SensorConfig, store: Arc<MeasurementStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Pull entry point: resolves the current accessory state
    /// synchronously. Runs on the protocol's request path, so it does
    /// nothing beyond the locked map lookup.
    ///
    /// A sensor that has never reported is inactive with a default
    /// value of 0.0, not faulted. Fault is cleared unconditionally; the
    /// wire format carries no hardware-fault field to reflect.
    pub fn current_state(&self) -> SensorState {
        debug!(serial = %self.config.serial, "resolving sensor state");
        match self.store.get(&self.config.serial) {
            Some(measurement) => SensorState {
                value: measurement.measurement_data.temperature,
                active: true,
                fault: false,
            },
            None => SensorState {
                value: 0.0,
                active: false,
                fault: false,
            },
        }
    }

    /// Push entry point: spawns a task that re-resolves every `cadence`
    /// and sends the result into `sink` for the accessory transport.
    ///
    /// The task exits promptly when `stop` fires (or its sender is
    /// dropped) and issues no update afterward. It also exits if the
    /// sink's receiver is gone, which means the transport is torn down.
    /// The first update goes out one full cadence after spawn, matching
    /// the poll-independent 60 second rhythm of the bridge.
    pub fn spawn_push(
        &self,
        sink: mpsc::Sender<SensorUpdate>,
        cadence: Duration,
        mut stop: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let adapter = self.clone();
        tokio::spawn(async move {
            let mut tick = time::interval(cadence);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval's first tick completes immediately; skip it so
            // the cadence starts counting from spawn.
            tick.tick().await;
            loop {
                tokio::select! {
                    _ = stop.changed() => {
                        debug!(serial = %adapter.config.serial, "push task stopping");
                        break;
                    }
                    _ = tick.tick() => {
                        let update = SensorUpdate {
                            serial: adapter.config.serial.clone(),
                            state: adapter.current_state(),
                        };
                        if sink.send(update).await.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }
}
