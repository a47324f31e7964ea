//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber once at startup
//! - Pick the filter from RUST_LOG, falling back to the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither RUST_LOG nor a level is configured.
pub const DEFAULT_DIRECTIVE: &str = "mock_apollo=info,tower_http=info";

/// Build the filter: RUST_LOG if set and valid, otherwise `level` applied to
/// this crate and to tower-http.
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => EnvFilter::new(format!("mock_apollo={level},tower_http={level}")),
        None => EnvFilter::new(DEFAULT_DIRECTIVE),
    })
}

/// Install the global subscriber. Must only be called once.
pub fn init_logging(level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
