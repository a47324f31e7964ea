use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::distribution::{ReloadReport, SourceStatus};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub pending_polls: usize,
    #[serde(with = "humantime_serde")]
    pub poll_timeout: Duration,
    pub sources: Vec<SourceStatus>,
}

#[derive(Serialize)]
pub struct TriggerSummary {
    pub triggered: usize,
}

pub async fn healthz(State(state): State<AdminState>) -> &'static str {
    let _pending = state.distribution.registry().pending_count();
    "OK"
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let distribution = &state.distribution;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        pending_polls: distribution.registry().pending_count(),
        poll_timeout: distribution.poll_timeout(),
        sources: distribution.sources(),
    })
}

/// Re-read every source without waking pending polls.
///
/// Answers 422 when any source failed to load; the reports say which.
/// Sources are read on the blocking pool.
pub async fn reload(State(state): State<AdminState>) -> (StatusCode, Json<Vec<ReloadReport>>) {
    let distribution = Arc::clone(&state.distribution);
    let reports = match tokio::task::spawn_blocking(move || distribution.reload_all()).await {
        Ok(reports) => reports,
        Err(e) => {
            tracing::error!(error = %e, "Manual reload aborted");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new()));
        }
    };
    let status = if reports.iter().all(|r| r.ok) {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    tracing::info!(sources = reports.len(), %status, "Manual reload requested");
    (status, Json(reports))
}

/// Re-read every source and wake all pending polls on success.
pub async fn trigger(State(state): State<AdminState>) -> Json<TriggerSummary> {
    let triggered = state.distribution.trigger_all();
    tracing::info!(triggered, "Change event triggered");
    Json(TriggerSummary { triggered })
}

pub async fn render_metrics(State(state): State<AdminState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
