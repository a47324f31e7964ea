//! Source change detection.
//!
//! # Responsibilities
//! - Observe the underlying source and report write/create/remove activity
//! - Report detector failures without stopping the watcher
//!
//! # Design Decisions
//! - Detection is injected; the watcher never owns a filesystem API directly
//! - File sources are polled at the watcher interval (works on any filesystem)
//! - An existing file is watched on its own, contents compared each tick
//! - A missing file falls back to its parent directory (metadata only) so it is
//!   picked up once created

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use notify::{Config, Event, PollWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Raw signal fed into a watcher's forwarding task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// The detector observed activity on the source.
    Changed,
    /// Synthesized by `SourceWatcher::trigger_event`.
    Triggered,
    /// The detector itself failed; logged only.
    Error(String),
}

/// Keeps a started detector alive. Detection stops when dropped.
pub struct DetectorHandle {
    inner: Mutex<Option<Box<dyn Send>>>,
}

impl DetectorHandle {
    pub fn new(inner: impl Send + 'static) -> Self {
        Self {
            inner: Mutex::new(Some(Box::new(inner))),
        }
    }

    /// A handle with nothing to keep alive.
    pub fn detached() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Whether a background detector is attached.
    pub fn is_active(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for DetectorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Monitoring activity for one source.
pub trait ChangeDetector: Send {
    /// Start delivering events at (at least) `interval` granularity.
    fn start(
        self: Box<Self>,
        interval: Duration,
        events: mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<DetectorHandle, notify::Error>;
}

/// Polls a file for content changes using `notify`'s poll watcher.
#[derive(Debug, Clone)]
pub struct PollDetector {
    path: PathBuf,
}

impl PollDetector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path handed to the poll watcher, and whether it is the file itself.
    fn watch_root(&self) -> (PathBuf, bool) {
        if self.path.is_file() {
            return (self.path.clone(), true);
        }
        match self.path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => (PathBuf::from("."), false),
            Some(parent) if parent.is_dir() => (parent.to_path_buf(), false),
            _ => (self.path.clone(), true),
        }
    }
}

impl ChangeDetector for PollDetector {
    fn start(
        self: Box<Self>,
        interval: Duration,
        events: mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<DetectorHandle, notify::Error> {
        let file_name = self.path.file_name().map(|name| name.to_os_string());
        let (root, direct) = self.watch_root();
        // Hashing a whole directory every tick is too costly; mtime suffices there.
        let config = Config::default()
            .with_poll_interval(interval)
            .with_compare_contents(direct);

        let mut watcher = PollWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_access() {
                        return;
                    }
                    let affects_source = event
                        .paths
                        .iter()
                        .any(|path| path.file_name() == file_name.as_deref());
                    if affects_source {
                        tracing::debug!(kind = ?event.kind, "Source change detected");
                        let _ = events.send(SourceEvent::Changed);
                    }
                }
                Err(e) => {
                    let _ = events.send(SourceEvent::Error(e.to_string()));
                }
            },
            config,
        )?;

        watcher.watch(&root, RecursiveMode::NonRecursive)?;
        tracing::debug!(root = %root.display(), direct, ?interval, "Poll detector started");

        Ok(DetectorHandle::new(watcher))
    }
}

/// A detector that never observes anything on its own; changes are only
/// signalled through `SourceWatcher::trigger_event`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualDetector;

impl ChangeDetector for ManualDetector {
    fn start(
        self: Box<Self>,
        _interval: Duration,
        _events: mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<DetectorHandle, notify::Error> {
        Ok(DetectorHandle::detached())
    }
}
