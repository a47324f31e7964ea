//! Distribution facade: owns the watchers and the poll registry.
//!
//! # Responsibilities
//! - Start one `SourceWatcher` per configured source, in order
//! - Resolve namespace reads across the watchers' current snapshots
//! - Run long polls against the shared `PollRegistry`
//! - Fan manual reloads and triggers out to every watcher

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::distribution::error::DistributionError;
use crate::distribution::namespace::{parse_namespace, ConfigFormat};
use crate::distribution::projection::Configurations;
use crate::longpoll::{Notification, PollOutcome, PollRegistry, PollSession};
use crate::snapshot::NamespaceConfig;
use crate::source::{ChangeDetector, ChangeReceiver, ConfigSource, LoadError, SourceWatcher};

/// A namespace located by [`Distribution::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceQuery {
    pub app: String,
    pub cluster: String,
    /// Canonical namespace id, extension stripped.
    pub namespace: String,
    pub format: ConfigFormat,
    pub config: NamespaceConfig,
}

impl NamespaceQuery {
    pub fn configurations(&self) -> Configurations {
        self.format.project(&self.config)
    }
}

/// Diagnostic view of one watched source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub source: String,
    pub published: bool,
    pub namespaces: usize,
    pub detecting: bool,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub last_error: Option<String>,
}

/// Result of a manual reload of one source.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadReport {
    pub source: String,
    pub ok: bool,
    pub error: Option<String>,
}

/// The set of watched sources plus the long-poll coordinator.
#[derive(Debug)]
pub struct Distribution {
    watchers: Vec<SourceWatcher>,
    registry: Arc<PollRegistry>,
    poll_timeout: Duration,
}

impl Distribution {
    pub fn new(poll_timeout: Duration) -> Self {
        Self {
            watchers: Vec::new(),
            registry: Arc::new(PollRegistry::new()),
            poll_timeout,
        }
    }

    /// Start watching `source` and attach its change events to the registry.
    ///
    /// The watcher is kept even when the initial load fails; its error is
    /// returned so the caller can decide whether that is fatal.
    pub fn add_source(
        &mut self,
        source: Arc<dyn ConfigSource>,
        detector: Box<dyn ChangeDetector>,
        interval: Duration,
    ) -> Result<(), LoadError> {
        let (watcher, changes, initial) = SourceWatcher::start(source, detector, interval);
        self.attach(watcher, changes);
        initial
    }

    /// Start watching a file on disk.
    pub fn watch_file(&mut self, path: impl Into<PathBuf>, interval: Duration) -> Result<(), LoadError> {
        let (watcher, changes, initial) = SourceWatcher::watch_file(path, interval);
        self.attach(watcher, changes);
        initial
    }

    fn attach(&mut self, watcher: SourceWatcher, changes: ChangeReceiver) {
        // The forwarding task ends on its own once the watcher is dropped.
        let _forwarder = self.registry.attach(changes);
        tracing::debug!(
            source = %watcher.source_name(),
            position = self.watchers.len(),
            "Source registered"
        );
        self.watchers.push(watcher);
    }

    /// Locate a namespace by its requested token.
    pub fn query(&self, app: &str, cluster: &str, token: &str) -> Result<NamespaceQuery, DistributionError> {
        let (namespace, format) = parse_namespace(token);
        let config = self
            .namespace(app, cluster, namespace)
            .ok_or_else(|| DistributionError::not_found(app, cluster, namespace))?;

        Ok(NamespaceQuery {
            app: app.to_string(),
            cluster: cluster.to_string(),
            namespace: namespace.to_string(),
            format,
            config,
        })
    }

    /// First registered watcher whose current snapshot holds the triple.
    pub fn namespace(&self, app: &str, cluster: &str, namespace: &str) -> Option<NamespaceConfig> {
        self.watchers.iter().find_map(|watcher| {
            watcher
                .config()
                .and_then(|snapshot| snapshot.namespace(app, cluster, namespace).cloned())
        })
    }

    /// Wait for a change on any source, for at most the poll timeout.
    pub async fn long_poll<F>(&self, notifications: Vec<Notification>, cancelled: F) -> PollOutcome
    where
        F: Future<Output = ()>,
    {
        PollSession::new(&self.registry, notifications, self.poll_timeout)
            .wait(cancelled)
            .await
    }

    /// Re-read every source without waking pending polls.
    pub fn reload_all(&self) -> Vec<ReloadReport> {
        self.watchers
            .iter()
            .map(|watcher| {
                let result = watcher.reload_config();
                ReloadReport {
                    source: watcher.source_name().to_string(),
                    ok: result.is_ok(),
                    error: result.err().map(|e| e.to_string()),
                }
            })
            .collect()
    }

    /// Ask every watcher to re-read and announce a change. Returns the
    /// number of watchers signalled.
    pub fn trigger_all(&self) -> usize {
        for watcher in &self.watchers {
            watcher.trigger_event();
        }
        self.watchers.len()
    }

    pub fn sources(&self) -> Vec<SourceStatus> {
        self.watchers
            .iter()
            .map(|watcher| {
                let snapshot = watcher.config();
                SourceStatus {
                    source: watcher.source_name().to_string(),
                    published: snapshot.is_some(),
                    namespaces: snapshot.map_or(0, |s| s.namespace_count()),
                    detecting: watcher.is_detecting(),
                    interval: watcher.interval(),
                    last_error: watcher.last_error(),
                }
            })
            .collect()
    }

    pub fn registry(&self) -> &Arc<PollRegistry> {
        &self.registry
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub fn source_count(&self) -> usize {
        self.watchers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ManualDetector, MemorySource};
    use std::collections::BTreeMap;
    use std::future::pending;

    const VALID: &str = "app:\n  cluster:\n    ns:\n      properties:\n        a: b\n";

    fn with_memory(distribution: &mut Distribution, source: &Arc<MemorySource>) -> Result<(), LoadError> {
        let source: Arc<dyn ConfigSource> = source.clone();
        distribution.add_source(source, Box::new(ManualDetector), Duration::from_secs(1))
    }

    async fn wait_for_pending(distribution: &Distribution, count: usize) {
        for _ in 0..200 {
            if distribution.registry().pending_count() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {count} pending polls");
    }

    #[tokio::test]
    async fn test_round_trip() {
        let mut distribution = Distribution::new(Duration::from_secs(1));
        let source = Arc::new(MemorySource::with_content("mem", VALID));
        with_memory(&mut distribution, &source).unwrap();

        let query = distribution.query("app", "cluster", "ns").unwrap();
        assert_eq!(query.format, ConfigFormat::Properties);
        assert_eq!(
            query.configurations(),
            Configurations::Properties(Some(BTreeMap::from([("a".to_string(), "b".to_string())])))
        );
    }

    #[tokio::test]
    async fn test_rejected_source_reads_not_found() {
        let mut distribution = Distribution::new(Duration::from_secs(1));
        let source = Arc::new(MemorySource::with_content("mem", "{}"));
        let err = with_memory(&mut distribution, &source).unwrap_err();
        assert_eq!(err.to_string(), "invalid config file");

        assert!(matches!(
            distribution.query("app", "cluster", "ns"),
            Err(DistributionError::NamespaceNotFound { .. })
        ));
        assert_eq!(distribution.source_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_prior_values() {
        let mut distribution = Distribution::new(Duration::from_secs(1));
        let source = Arc::new(MemorySource::with_content("mem", VALID));
        with_memory(&mut distribution, &source).unwrap();

        source.set("app: [broken");
        let reports = distribution.reload_all();
        assert!(!reports[0].ok);
        assert!(reports[0].error.is_some());

        let ns = distribution.namespace("app", "cluster", "ns").unwrap();
        assert_eq!(ns.properties.unwrap()["a"], "b");
        assert!(distribution.sources()[0].last_error.is_some());
    }

    #[tokio::test]
    async fn test_first_registered_source_wins() {
        let mut distribution = Distribution::new(Duration::from_secs(1));
        let first = Arc::new(MemorySource::with_content("first", VALID));
        let second = Arc::new(MemorySource::with_content(
            "second",
            "app:\n  cluster:\n    ns:\n      properties:\n        a: shadowed\n    other:\n      properties:\n        x: y\n",
        ));
        with_memory(&mut distribution, &first).unwrap();
        with_memory(&mut distribution, &second).unwrap();

        assert_eq!(distribution.namespace("app", "cluster", "ns").unwrap().properties.unwrap()["a"], "b");
        assert!(distribution.namespace("app", "cluster", "other").is_some());
    }

    #[tokio::test]
    async fn test_lookup_uses_full_triple() {
        let mut distribution = Distribution::new(Duration::from_secs(1));
        let source = Arc::new(MemorySource::with_content("mem", VALID));
        with_memory(&mut distribution, &source).unwrap();

        assert!(distribution.query("other-app", "cluster", "ns").is_err());
        assert!(distribution.query("app", "other", "ns").is_err());
    }

    #[tokio::test]
    async fn test_trigger_wakes_every_pending_poll() {
        let mut distribution = Distribution::new(Duration::from_secs(30));
        let source = Arc::new(MemorySource::with_content("mem", VALID));
        with_memory(&mut distribution, &source).unwrap();
        let distribution = Arc::new(distribution);

        let mut waiters = Vec::new();
        for i in 0..3 {
            let distribution = Arc::clone(&distribution);
            let request = vec![Notification::new(format!("ns-{i}"), i)];
            waiters.push(tokio::spawn(async move {
                let outcome = distribution.long_poll(request.clone(), pending()).await;
                (request, outcome)
            }));
        }
        wait_for_pending(&distribution, 3).await;

        assert_eq!(distribution.trigger_all(), 1);
        for waiter in waiters {
            let (request, outcome) = tokio::time::timeout(Duration::from_secs(2), waiter)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(outcome, PollOutcome::Changed(request));
        }
        assert_eq!(distribution.registry().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_manual_reload_does_not_wake_polls() {
        let mut distribution = Distribution::new(Duration::from_millis(300));
        let source = Arc::new(MemorySource::with_content("mem", VALID));
        with_memory(&mut distribution, &source).unwrap();
        let distribution = Arc::new(distribution);

        let poller = {
            let distribution = Arc::clone(&distribution);
            tokio::spawn(async move { distribution.long_poll(vec![Notification::new("ns", 1)], pending()).await })
        };
        wait_for_pending(&distribution, 1).await;

        assert!(distribution.reload_all()[0].ok);
        assert_eq!(poller.await.unwrap(), PollOutcome::Unchanged);
    }
}
