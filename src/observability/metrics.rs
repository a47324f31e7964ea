//! Metrics collection and exposition.
//!
//! # Metrics
//! - `apollo_source_reloads_total` (counter): load attempts by source, outcome
//! - `apollo_change_events_total` (counter): change events emitted by source
//! - `apollo_long_polls_total` (counter): resolved long polls by outcome
//! - `apollo_pending_polls` (gauge): sessions currently waiting
//! - `apollo_http_requests_total` (counter): public requests by route, status
//!
//! # Design Decisions
//! - The Prometheus recorder is installed at most once per process
//! - Exposition is pull-only, rendered by the internal `/metrics` handler

use std::sync::OnceLock;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder, or return the one already
/// installed by this module.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(HANDLE.get_or_init(|| handle).clone())
}

/// Record one load attempt. `outcome` is `success` or a [`LoadError`] kind.
///
/// [`LoadError`]: crate::source::LoadError
pub fn record_reload(source: &str, outcome: &'static str) {
    ::metrics::counter!(
        "apollo_source_reloads_total",
        "source" => source.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_change_event(source: &str) {
    ::metrics::counter!("apollo_change_events_total", "source" => source.to_string()).increment(1);
}

pub fn record_poll(outcome: &'static str) {
    ::metrics::counter!("apollo_long_polls_total", "outcome" => outcome).increment(1);
}

pub fn set_pending_polls(pending: usize) {
    ::metrics::gauge!("apollo_pending_polls").set(pending as f64);
}

pub fn record_request(route: &'static str, status: u16) {
    ::metrics::counter!(
        "apollo_http_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}
