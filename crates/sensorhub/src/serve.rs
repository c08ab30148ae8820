use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sensorhub_core::{MeasurementStore, Receiver, SensorAdapter, TaskRegistry};
use tokio::sync::mpsc;
use tracing::info;

use crate::bridge;
use crate::config::Config;

/// Cadence of the poll-independent value pushes; protocols that cache
/// expect unsolicited updates on this rhythm.
const PUSH_CADENCE: Duration = Duration::from_secs(60);

/// Assembles the bridge and runs it until Ctrl-C, then tears everything
/// down in order: tasks are signaled and joined before the socket and
/// the transport sink are dropped.
pub async fn run(config: Config) -> Result<()> {
    let store = Arc::new(MeasurementStore::new());
    let mut registry = TaskRegistry::new();

    let receiver = Receiver::bind(
        (Ipv4Addr::UNSPECIFIED, config.receiver.port),
        Arc::clone(&store),
    )
    .await
    .with_context(|| format!("could not bind receiver on port {}", config.receiver.port))?;
    info!("listening on {}", receiver.local_addr()?);

    let stop = registry.stop_handle();
    registry.track(tokio::spawn(receiver.run(stop)));

    let (updates_tx, updates_rx) = mpsc::channel(32);
    for sensor in &config.bridge.sensors {
        let adapter = SensorAdapter::new(sensor.clone(), Arc::clone(&store));
        let stop = registry.stop_handle();
        registry.track(adapter.spawn_push(updates_tx.clone(), PUSH_CADENCE, stop));
    }
    info!(sensors = config.bridge.sensors.len(), "adapters started");

    let transport = bridge::spawn_transport(&config.bridge, updates_rx);

    tokio::signal::ctrl_c()
        .await
        .context("could not listen for the shutdown signal")?;
    info!("shutdown signal received");

    registry.shutdown().await;
    drop(updates_tx);
    transport.await.context("accessory transport task failed")?;

    Ok(())
}
