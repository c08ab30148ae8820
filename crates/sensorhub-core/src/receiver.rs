use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::measurement::Measurement;
use crate::store::MeasurementStore;

/// Receive buffer size. Datagrams larger than this are silently
/// truncated, which normally makes them fail to decode.
pub const MAX_DATAGRAM: usize = 1024;

/// Owns the UDP listening socket and feeds decoded measurements into
/// the store. Sole writer to the store.
pub struct Receiver {
    socket: UdpSocket,
    store: Arc<MeasurementStore>,
}

impl Receiver {
    /// Binds the listening socket. A bind failure is a startup
    /// precondition violation; callers treat it as fatal.
    pub async fn bind(addr: impl ToSocketAddrs, store: Arc<MeasurementStore>) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket, store })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive loop. Decode failures are logged and skipped, socket
    /// read errors are treated as transient, and nothing is ever
    /// retried or acknowledged; sensors resend on their own cadence.
    /// Returns when `stop` fires (or its sender is dropped), closing
    /// the socket with it.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            tokio::select! {
                _ = stop.changed() => {
                    info!("receiver stopping");
                    return;
                }
                received = self.socket.recv_from(&mut buf) => {
                    let (len, peer) = match received {
                        Ok(received) => received,
                        Err(err) => {
                            debug!(%err, "transient socket read error");
                            continue;
                        }
                    };
                    match Measurement::decode(&buf[..len]) {
                        Ok(measurement) => {
                            info!(
                                sensor_id = %measurement.sensor_id,
                                temperature = measurement.measurement_data.temperature,
                                humidity = measurement.measurement_data.humidity,
                                "measurement received"
                            );
                            self.store.put(measurement);
                        }
                        Err(err) => {
                            warn!(%peer, %err, "discarding undecodable datagram");
                        }
                    }
                }
            }
        }
    }
}
