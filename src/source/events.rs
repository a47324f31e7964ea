//! Rendezvous delivery of change events.
//!
//! The publisher hands one [`ChangeEvent`] at a time to the single consumer
//! and does not continue until the consumer has taken it (acknowledged or
//! dropped). A dropped consumer turns delivery into a no-op.

use tokio::sync::{mpsc, oneshot};

/// Signal that a source published a new snapshot.
#[derive(Debug)]
pub struct ChangeEvent {
    source: String,
    ack: oneshot::Sender<()>,
}

impl ChangeEvent {
    /// Name of the source that changed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Release the publisher.
    pub fn acknowledge(self) {
        let _ = self.ack.send(());
    }
}

/// Publishing half, owned by a watcher's forwarding task.
#[derive(Debug)]
pub struct ChangeSender {
    tx: mpsc::Sender<ChangeEvent>,
}

impl ChangeSender {
    /// Deliver one event and wait until the consumer has taken it.
    ///
    /// Returns `false` when no consumer is attached any more.
    pub async fn deliver(&self, source: &str) -> bool {
        let (ack, acked) = oneshot::channel();
        let event = ChangeEvent {
            source: source.to_string(),
            ack,
        };
        if self.tx.send(event).await.is_err() {
            return false;
        }
        // Err only means the consumer dropped the event without acknowledging.
        let _ = acked.await;
        true
    }
}

/// Consuming half; exactly one exists per watcher.
#[derive(Debug)]
pub struct ChangeReceiver {
    rx: mpsc::Receiver<ChangeEvent>,
}

impl ChangeReceiver {
    /// Wait for the next change event. `None` once the watcher is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }
}

/// Create a connected sender/receiver pair.
pub fn change_channel() -> (ChangeSender, ChangeReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (ChangeSender { tx }, ChangeReceiver { rx })
}
