//! A single long-poll wait.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::longpoll::notification::Notification;
use crate::longpoll::registry::{PollRegistry, Registration, SessionId};
use crate::observability::metrics;

/// Resolution state of a session. Moves forward from `Pending` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Pending,
    Changed,
    Unchanged,
}

impl PollState {
    fn label(self) -> &'static str {
        match self {
            PollState::Pending => "pending",
            PollState::Changed => "changed",
            PollState::Unchanged => "unchanged",
        }
    }
}

/// What the waiting caller observes.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// A change occurred; carries the original request verbatim.
    Changed(Vec<Notification>),
    /// Timed out or cancelled.
    Unchanged,
}

impl PollOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, PollOutcome::Changed(_))
    }

    pub fn notifications(&self) -> Option<&[Notification]> {
        match self {
            PollOutcome::Changed(notifications) => Some(notifications),
            PollOutcome::Unchanged => None,
        }
    }

    pub fn state(&self) -> PollState {
        match self {
            PollOutcome::Changed(_) => PollState::Changed,
            PollOutcome::Unchanged => PollState::Unchanged,
        }
    }
}

/// One client's bounded wait for a change.
///
/// The session is registered on construction. [`wait`](Self::wait) consumes
/// it, so an outcome is produced at most once; the session leaves the
/// registry before the outcome is returned, or when it is dropped unresolved.
#[derive(Debug)]
pub struct PollSession {
    notifications: Vec<Notification>,
    deadline: Instant,
    state: PollState,
    signal: mpsc::Receiver<()>,
    registration: Option<Registration>,
}

impl PollSession {
    pub fn new(registry: &Arc<PollRegistry>, notifications: Vec<Notification>, timeout: Duration) -> Self {
        let (registration, signal) = registry.register();
        Self {
            notifications,
            deadline: Instant::now() + timeout,
            state: PollState::Pending,
            signal,
            registration: Some(registration),
        }
    }

    pub fn id(&self) -> Option<SessionId> {
        self.registration.as_ref().map(Registration::id)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Suspend until a change is broadcast, the deadline passes, or
    /// `cancelled` completes.
    pub async fn wait<F>(mut self, cancelled: F) -> PollOutcome
    where
        F: Future<Output = ()>,
    {
        let deadline = self.deadline;
        let resolved = tokio::select! {
            Some(()) = self.signal.recv() => PollState::Changed,
            _ = tokio::time::sleep_until(deadline) => PollState::Unchanged,
            _ = cancelled => PollState::Unchanged,
        };
        self.resolve(resolved)
    }

    fn resolve(&mut self, resolved: PollState) -> PollOutcome {
        debug_assert_eq!(self.state, PollState::Pending);
        self.state = resolved;
        let id = self.id();
        self.registration.take();

        metrics::record_poll(resolved.label());
        tracing::debug!(session = ?id, outcome = resolved.label(), "Poll session resolved");

        match resolved {
            PollState::Changed => PollOutcome::Changed(std::mem::take(&mut self.notifications)),
            PollState::Pending | PollState::Unchanged => PollOutcome::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;

    fn request() -> Vec<Notification> {
        vec![Notification::new("ns", 1)]
    }

    #[tokio::test]
    async fn test_broadcast_resolves_changed() {
        let registry = Arc::new(PollRegistry::new());
        let session = PollSession::new(&registry, request(), Duration::from_secs(10));
        assert_eq!(session.state(), PollState::Pending);
        assert_eq!(registry.pending_count(), 1);

        registry.broadcast();
        let outcome = session.wait(pending()).await;

        assert_eq!(outcome, PollOutcome::Changed(request()));
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves_unchanged_not_before_deadline() {
        let registry = Arc::new(PollRegistry::new());
        let started = Instant::now();
        let session = PollSession::new(&registry, request(), Duration::from_secs(30));

        let outcome = session.wait(pending()).await;

        assert_eq!(outcome, PollOutcome::Unchanged);
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_resolves_unchanged() {
        let registry = Arc::new(PollRegistry::new());
        let session = PollSession::new(&registry, request(), Duration::from_secs(60));
        let (cancel, cancelled) = tokio::sync::oneshot::channel::<()>();

        let waiter = tokio::spawn(session.wait(async move {
            let _ = cancelled.await;
        }));
        cancel.send(()).unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancellation must resolve promptly")
            .unwrap();
        assert_eq!(outcome, PollOutcome::Unchanged);
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_session_deregisters() {
        let registry = Arc::new(PollRegistry::new());
        let session = PollSession::new(&registry, request(), Duration::from_secs(60));
        assert_eq!(registry.pending_count(), 1);
        drop(session);
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_session_registered_after_broadcast_is_unaffected() {
        let registry = Arc::new(PollRegistry::new());
        registry.broadcast();

        let session = PollSession::new(&registry, request(), Duration::from_millis(50));
        assert_eq!(session.wait(pending()).await, PollOutcome::Unchanged);
    }
}
