use sensorhub_core::SensorUpdate;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::BridgeConfig;

/// Stand-in for the accessory-protocol transport: announces the bridge
/// identity and drains the adapters' update channel. Protocol framing,
/// discovery and pairing live in the real transport, behind this
/// boundary.
pub fn spawn_transport(
    config: &BridgeConfig,
    mut updates: mpsc::Receiver<SensorUpdate>,
) -> JoinHandle<()> {
    info!(
        name = %config.name,
        manufacturer = %config.manufacturer,
        model = %config.model,
        address = %config.address,
        "accessory bridge up"
    );

    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            info!(
                serial = %update.serial,
                value = update.state.value,
                active = update.state.active,
                fault = update.state.fault,
                "value pushed to accessory transport"
            );
        }
        info!("accessory transport drained");
    })
}
