//! Registry of pending poll sessions.
//!
//! # Responsibilities
//! - Track which sessions are currently waiting
//! - Fan a change event out to every pending session
//! - Forward change events from each attached watcher
//!
//! # Design Decisions
//! - One mutex guards the pending set; no I/O happens while it is held
//! - The pending gauge is updated under that mutex so it tracks the set exactly
//! - Each session owns a capacity-1 signal written with `try_send`
//! - Registration is an RAII guard, so a dropped session always deregisters

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::source::ChangeReceiver;

/// Identifier of one registered session.
pub type SessionId = u64;

/// The set of pending long-poll sessions.
#[derive(Debug, Default)]
pub struct PollRegistry {
    pending: Mutex<HashMap<SessionId, mpsc::Sender<()>>>,
    next_id: AtomicU64,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to the pending set.
    ///
    /// Returns the guard that removes it again and the receiving end of its
    /// wakeup signal.
    pub fn register(self: &Arc<Self>) -> (Registration, mpsc::Receiver<()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(1);

        let pending = {
            let mut pending = self.lock();
            pending.insert(id, tx);
            metrics::set_pending_polls(pending.len());
            pending.len()
        };
        tracing::trace!(session = id, pending, "Poll session registered");

        let registration = Registration {
            id,
            registry: Arc::clone(self),
        };
        (registration, rx)
    }

    fn deregister(&self, id: SessionId) {
        let pending = {
            let mut pending = self.lock();
            pending.remove(&id);
            metrics::set_pending_polls(pending.len());
            pending.len()
        };
        tracing::trace!(session = id, pending, "Poll session deregistered");
    }

    /// Signal every currently pending session. Returns how many were pending.
    ///
    /// Never blocks: a session that was already signalled or has gone away
    /// is skipped.
    pub fn broadcast(&self) -> usize {
        let pending = self.lock();
        for (id, signal) in pending.iter() {
            match signal.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(TrySendError::Closed(())) => {
                    tracing::debug!(session = id, "Poll session gone before wakeup");
                }
            }
        }
        pending.len()
    }

    /// Number of sessions currently waiting.
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    /// Spawn the forwarding task for one watcher's change events.
    ///
    /// Each event is acknowledged on receipt and then broadcast. The task
    /// ends when the watcher is dropped.
    pub fn attach(self: &Arc<Self>, mut changes: ChangeReceiver) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = changes.recv().await {
                let source = event.source().to_string();
                event.acknowledge();
                let woken = registry.broadcast();
                tracing::debug!(source = %source, woken, "Change broadcast to pending polls");
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, mpsc::Sender<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Membership of one session in the pending set; removed on drop.
#[derive(Debug)]
pub struct Registration {
    id: SessionId,
    registry: Arc<PollRegistry>,
}

impl Registration {
    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_drop() {
        let registry = Arc::new(PollRegistry::new());
        let (a, _rx_a) = registry.register();
        let (b, _rx_b) = registry.register();
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.pending_count(), 2);

        drop(a);
        assert_eq!(registry.pending_count(), 1);
        drop(b);
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_broadcast_is_buffered_and_non_blocking() {
        let registry = Arc::new(PollRegistry::new());
        let (_reg, mut rx) = registry.register();

        // Nobody is receiving yet; repeated broadcasts must not block.
        assert_eq!(registry.broadcast(), 1);
        assert_eq!(registry.broadcast(), 1);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "signal is coalesced to one wakeup");
    }

    #[test]
    fn test_broadcast_skips_abandoned_receivers() {
        let registry = Arc::new(PollRegistry::new());
        let (_gone, rx_gone) = registry.register();
        let (_live, mut rx_live) = registry.register();
        drop(rx_gone);

        assert_eq!(registry.broadcast(), 2);
        assert!(rx_live.try_recv().is_ok());
    }

    #[test]
    fn test_pending_gauge_tracks_set() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let registry = Arc::new(PollRegistry::new());

        ::metrics::with_local_recorder(&recorder, || {
            let (a, _rx_a) = registry.register();
            let (_b, _rx_b) = registry.register();
            let (c, _rx_c) = registry.register();
            drop(a);
            drop(c);
        });

        let rendered = handle.render();
        let gauge = rendered
            .lines()
            .find_map(|line| line.strip_prefix("apollo_pending_polls "))
            .and_then(|value| value.trim().parse::<f64>().ok());
        assert_eq!(gauge, Some(0.0));
    }

    #[tokio::test]
    async fn test_attach_forwards_change_events() {
        let registry = Arc::new(PollRegistry::new());
        let (changes, receiver) = crate::source::change_channel();
        let forwarder = registry.attach(receiver);

        let (_reg, mut rx) = registry.register();
        assert!(changes.deliver("src").await);
        assert_eq!(rx.recv().await, Some(()));

        drop(changes);
        forwarder.await.unwrap();
    }
}
