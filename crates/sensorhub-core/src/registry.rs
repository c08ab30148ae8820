use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

/// Stop handles and join handles for every long-running task in the
/// bridge: the receiver loop plus one push task per adapter.
///
/// Handles are collected at construction time so that teardown can
/// signal and await all of them before the socket or the outward
/// transport is dropped. Each task gets its own stop channel, so a
/// single adapter can also be torn down without touching the rest.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    stops: Vec<watch::Sender<bool>>,
    handles: Vec<JoinHandle<()>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a stop channel for one task. The returned receiver is
    /// handed to the task; the sender stays in the registry.
    pub fn stop_handle(&mut self) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        self.stops.push(tx);
        rx
    }

    /// Tracks a spawned task so shutdown can await its exit.
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    /// Signals every registered task to stop and waits for all of them
    /// to finish.
    pub async fn shutdown(self) {
        for stop in &self.stops {
            // A task that already exited has dropped its receiver.
            let _ = stop.send(true);
        }
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!(%err, "task did not shut down cleanly");
            }
        }
    }
}
