//! Settings schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root settings of the mock server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Configuration documents to serve, in lookup order.
    pub sources: Vec<PathBuf>,

    pub listener: ListenerConfig,

    /// How long a long poll is held before answering "not modified".
    #[serde(with = "humantime_serde")]
    pub poll_timeout: Duration,

    /// How often each source is checked for changes (floor: 1s).
    #[serde(with = "humantime_serde")]
    pub watch_interval: Duration,

    pub observability: ObservabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            listener: ListenerConfig::default(),
            poll_timeout: Duration::from_secs(60),
            watch_interval: Duration::from_secs(1),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host both servers bind to.
    pub bind_host: String,

    /// Port of the public config API.
    pub config_port: u16,

    /// Port of the internal control and telemetry API.
    pub internal_port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            config_port: 8070,
            internal_port: 9090,
        }
    }
}

impl ListenerConfig {
    pub fn config_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.config_port)
    }

    pub fn internal_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.internal_port)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    pub log_level: String,

    /// Serve Prometheus metrics on the internal port.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}
