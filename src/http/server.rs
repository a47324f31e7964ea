//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the config API handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve a listener until shutdown is triggered

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::distribution::Distribution;
use crate::http::handlers::{
    healthz, long_polling, not_found, query_config, query_config_file, query_service,
};
use crate::http::request::make_request_span;
use crate::lifecycle::Shutdown;

/// Slack on top of the poll timeout before a request is cut off.
const REQUEST_GRACE: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub distribution: Arc<Distribution>,
    pub shutdown: Shutdown,
    /// Port advertised by `/services/config`.
    pub port: u16,
}

/// Build the public router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let timeout = state.distribution.poll_timeout() + REQUEST_GRACE;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/configs/{app_id}/{cluster}/{namespace}", get(query_config))
        .route(
            "/configfiles/{format}/{app_id}/{cluster}/{namespace}",
            get(query_config_file),
        )
        .route("/services/config", get(query_service))
        .route("/notifications/v2", get(long_polling))
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(timeout)),
        )
}

/// Serve `router` on `listener` until `shutdown` is triggered, then drain
/// in-flight requests.
pub async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    shutdown: Shutdown,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(server = name, address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!(server = name, "HTTP server stopped");
    Ok(())
}

/// HTTP server for the public config API.
pub struct HttpServer {
    router: Router,
    shutdown: Shutdown,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let shutdown = state.shutdown.clone();
        Self {
            router: build_router(state),
            shutdown,
        }
    }

    /// The router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        serve("config", listener, self.router, self.shutdown).await
    }
}
