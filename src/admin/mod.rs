//! Internal control and telemetry API.
//!
//! Served on its own port, separate from the public config API, without
//! authentication.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use self::handlers::*;
use crate::distribution::Distribution;

/// State shared by the internal handlers.
#[derive(Clone)]
pub struct AdminState {
    pub distribution: Arc<Distribution>,
    /// `None` when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(get_status))
        .route("/reload", post(reload))
        .route("/trigger", post(trigger))
        .route("/metrics", get(render_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
