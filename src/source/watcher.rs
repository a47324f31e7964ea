//! Source watcher: owns one source and its published snapshot.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::mpsc;

use crate::observability::metrics;
use crate::snapshot::{validate_snapshot, ConfigSnapshot};
use crate::source::detector::{ChangeDetector, DetectorHandle, PollDetector, SourceEvent};
use crate::source::error::LoadError;
use crate::source::events::{change_channel, ChangeReceiver, ChangeSender};
use crate::source::reader::{ConfigSource, FileSource};

/// Smallest accepted watch interval; shorter requests are raised to it.
pub const MIN_WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// State shared between the watcher handle and its forwarding task.
struct WatchState {
    source: Arc<dyn ConfigSource>,
    snapshot: ArcSwapOption<ConfigSnapshot>,
    last_error: ArcSwapOption<String>,
    /// Serializes read-and-store so publishes follow read order.
    publish: Mutex<()>,
}

impl WatchState {
    fn name(&self) -> &str {
        self.source.name()
    }

    /// Read, parse, validate and publish. The published snapshot is only
    /// replaced on success.
    fn load(&self) -> Result<Arc<ConfigSnapshot>, LoadError> {
        let _publish = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        match read_snapshot(self.source.as_ref()) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.snapshot.store(Some(Arc::clone(&snapshot)));
                self.last_error.store(None);
                metrics::record_reload(self.name(), "success");
                Ok(snapshot)
            }
            Err(e) => {
                self.last_error.store(Some(Arc::new(e.to_string())));
                metrics::record_reload(self.name(), e.kind());
                Err(e)
            }
        }
    }
}

fn read_snapshot(source: &dyn ConfigSource) -> Result<ConfigSnapshot, LoadError> {
    let bytes = source.read().map_err(|error| LoadError::SourceUnreadable {
        source_name: source.name().to_string(),
        error,
    })?;
    let snapshot = ConfigSnapshot::from_slice(&bytes)?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

/// Watches one configuration source and keeps the latest valid snapshot
/// available to readers.
///
/// Background activities stop once the watcher is dropped.
pub struct SourceWatcher {
    state: Arc<WatchState>,
    interval: Duration,
    trigger: mpsc::UnboundedSender<SourceEvent>,
    detector: Option<DetectorHandle>,
}

impl SourceWatcher {
    /// Start watching `source`.
    ///
    /// The forwarding task and the detector are started before the initial
    /// load, and keep running whatever its outcome. The initial load result
    /// is returned alongside the watcher so the caller may choose to ignore
    /// it and wait for a valid write. Must be called within a Tokio runtime.
    pub fn start(
        source: Arc<dyn ConfigSource>,
        detector: Box<dyn ChangeDetector>,
        interval: Duration,
    ) -> (Self, ChangeReceiver, Result<(), LoadError>) {
        let interval = interval.max(MIN_WATCH_INTERVAL);
        let state = Arc::new(WatchState {
            source,
            snapshot: ArcSwapOption::empty(),
            last_error: ArcSwapOption::empty(),
            publish: Mutex::new(()),
        });

        let (trigger, raw_events) = mpsc::unbounded_channel();
        let (changes, change_rx) = change_channel();
        tokio::spawn(forward_events(Arc::clone(&state), raw_events, changes));

        let detector = match detector.start(interval, trigger.clone()) {
            Ok(handle) => {
                tracing::info!(source = %state.name(), ?interval, "Started watching source");
                Some(handle)
            }
            Err(e) => {
                tracing::error!(
                    source = %state.name(),
                    error = %e,
                    "Failed to start change detection; only triggered reloads will apply"
                );
                None
            }
        };

        let initial = state.load().map(|_| ());
        if let Err(e) = &initial {
            tracing::error!(source = %state.name(), error = %e, "Initial config load failed");
        }

        let watcher = Self {
            state,
            interval,
            trigger,
            detector,
        };
        (watcher, change_rx, initial)
    }

    /// Watch a file on disk, polling it every `interval`.
    pub fn watch_file(
        path: impl Into<PathBuf>,
        interval: Duration,
    ) -> (Self, ChangeReceiver, Result<(), LoadError>) {
        let path = path.into();
        Self::start(
            Arc::new(FileSource::new(path.clone())),
            Box::new(PollDetector::new(path)),
            interval,
        )
    }

    /// Synchronously re-read and publish. Never emits a change event.
    pub fn reload_config(&self) -> Result<(), LoadError> {
        match self.state.load() {
            Ok(snapshot) => {
                tracing::info!(
                    source = %self.state.name(),
                    namespaces = snapshot.namespace_count(),
                    "Config reloaded manually"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(source = %self.state.name(), error = %e, "Manual reload failed");
                Err(e)
            }
        }
    }

    /// Signal a change without waiting for the detector. The source is
    /// re-read by the forwarding task exactly as for a detected change.
    pub fn trigger_event(&self) {
        if self.trigger.send(SourceEvent::Triggered).is_err() {
            tracing::warn!(source = %self.state.name(), "Watcher event loop has stopped");
        }
    }

    /// Latest published snapshot, or `None` if nothing valid was ever loaded.
    pub fn config(&self) -> Option<Arc<ConfigSnapshot>> {
        self.state.snapshot.load_full()
    }

    /// Message of the most recent failed load, cleared by a successful one.
    pub fn last_error(&self) -> Option<String> {
        self.state.last_error.load_full().map(|e| String::clone(&e))
    }

    pub fn source_name(&self) -> &str {
        self.state.name()
    }

    /// Effective poll interval (after the floor is applied).
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a background detector is running for this source.
    pub fn is_detecting(&self) -> bool {
        self.detector.as_ref().is_some_and(DetectorHandle::is_active)
    }
}

impl std::fmt::Debug for SourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWatcher")
            .field("source", &self.state.name())
            .field("interval", &self.interval)
            .field("published", &self.state.snapshot.load().is_some())
            .finish()
    }
}

/// Forwarding task: turns raw source events into reloads and change events.
async fn forward_events(
    state: Arc<WatchState>,
    mut events: mpsc::UnboundedReceiver<SourceEvent>,
    changes: ChangeSender,
) {
    while let Some(event) = events.recv().await {
        match &event {
            SourceEvent::Changed | SourceEvent::Triggered => {
                tracing::debug!(source = %state.name(), ?event, "Watcher received event");
                match state.load() {
                    Ok(snapshot) => {
                        tracing::info!(
                            source = %state.name(),
                            namespaces = snapshot.namespace_count(),
                            "Watcher loaded new config"
                        );
                        metrics::record_change_event(state.name());
                        if !changes.deliver(state.name()).await {
                            tracing::debug!(source = %state.name(), "No consumer attached for change events");
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            source = %state.name(),
                            error = %e,
                            "Failed to reload config. Keeping current configuration."
                        );
                    }
                }
            }
            SourceEvent::Error(message) => {
                tracing::error!(source = %state.name(), error = %message, "Watch error");
            }
        }
    }
    tracing::debug!(source = %state.name(), "Watcher event loop stopped");
}
