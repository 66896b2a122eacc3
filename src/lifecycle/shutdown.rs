//! Graceful shutdown for the relay and producer servers.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::lifecycle::signals;

/// Broadcasts a single stop signal to every subscribed server.
///
/// Cloning yields another handle to the same signal.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscribed server. In-flight streams are allowed to finish.
    pub fn trigger(&self) {
        if self.tx.send(()).is_ok() {
            tracing::debug!(servers = self.tx.receiver_count(), "Shutdown triggered");
        }
    }

    /// Servers that have not yet observed the signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Trigger once the process receives Ctrl+C or SIGTERM.
    pub fn trigger_on_signal(&self) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            handle.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
