use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use sensorhub_core::SensorConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub receiver: ReceiverConfig,
    pub bridge: BridgeConfig,
}

#[derive(Debug, Deserialize)]
pub struct ReceiverConfig {
    pub port: u16,
}

/// Bridge identity and pairing metadata, handed through to the
/// accessory transport. Loaded once at startup, not reloadable.
#[derive(Debug, Deserialize)]
pub struct BridgeConfig {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub pin: String,
    pub address: String,
    pub sensors: Vec<SensorConfig>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("could not parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.bridge.sensors.is_empty(),
            "configuration lists no sensors"
        );
        ensure!(
            self.bridge.pin.len() == 8 && self.bridge.pin.chars().all(|c| c.is_ascii_digit()),
            "pairing pin must be exactly 8 digits"
        );
        let mut seen = HashSet::new();
        for sensor in &self.bridge.sensors {
            ensure!(
                !sensor.serial.is_empty(),
                "sensor '{}' has an empty serial",
                sensor.name
            );
            ensure!(
                seen.insert(sensor.serial.as_str()),
                "duplicate sensor serial '{}'",
                sensor.serial
            );
        }
        Ok(())
    }
}
