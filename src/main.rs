//! Mock Apollo config service.
//!
//! Serves namespaced configuration from local documents over the Apollo
//! config service HTTP API, including long-poll change notifications.
//!
//! # Architecture Overview
//!
//! ```text
//!   config documents ──▶ source::SourceWatcher (one per document)
//!                              │ snapshot swap      │ change event
//!                              ▼                    ▼
//!   GET /configs ──────▶ distribution::Distribution ──▶ longpoll::PollRegistry
//!   GET /configfiles           │                          │ broadcast
//!   GET /notifications/v2 ─────┴──────────────────▶ longpoll::PollSession
//!
//!   internal port: /healthz /status /reload /trigger /metrics
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use mock_apollo::admin::{setup_admin_router, AdminState};
use mock_apollo::config::{finalize, read_config, ServerConfig};
use mock_apollo::http::{serve, AppState, HttpServer};
use mock_apollo::lifecycle::startup::build_distribution;
use mock_apollo::lifecycle::{materialize_inline_source, spawn_signal_handler, Shutdown};
use mock_apollo::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "mock-apollo", version)]
#[command(about = "Mock Apollo config service backed by local files", long_about = None)]
struct Cli {
    /// Settings file (TOML); flags below override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Config document to serve; repeat for several, earlier ones win
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Port of the public config API [default: 8070]
    #[arg(long)]
    config_port: Option<u16>,

    /// Port of the internal control API [default: 9090]
    #[arg(long)]
    internal_port: Option<u16>,

    /// Host both servers bind to [default: 0.0.0.0]
    #[arg(long)]
    bind_host: Option<String>,

    /// Long poll timeout, e.g. "30s" [default: 1m]
    #[arg(long, value_parser = humantime::parse_duration)]
    poll_timeout: Option<Duration>,

    /// How often sources are checked for changes [default: 1s]
    #[arg(long, value_parser = humantime::parse_duration)]
    watch_interval: Option<Duration>,

    /// Log level when RUST_LOG is not set [default: info]
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Apply command line overrides on top of the loaded settings.
    fn apply(self, config: &mut ServerConfig) {
        if !self.files.is_empty() {
            config.sources = self.files;
        }
        if let Some(port) = self.config_port {
            config.listener.config_port = port;
        }
        if let Some(port) = self.internal_port {
            config.listener.internal_port = port;
        }
        if let Some(host) = self.bind_host {
            config.listener.bind_host = host;
        }
        if let Some(timeout) = self.poll_timeout {
            config.poll_timeout = timeout;
        }
        if let Some(interval) = self.watch_interval {
            config.watch_interval = interval;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    let mut config = match cli.config.take() {
        Some(path) => read_config(&path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config);

    logging::init_logging(Some(&config.observability.log_level));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mock-apollo starting");

    let inline = materialize_inline_source(&std::env::temp_dir(), |name| std::env::var(name).ok())?;
    if let Some(inline) = &inline {
        config.sources.insert(0, inline.path().to_path_buf());
    }
    let config = finalize(config)?;

    tracing::info!(
        sources = ?config.sources,
        config_port = config.listener.config_port,
        internal_port = config.listener.internal_port,
        poll_timeout = ?config.poll_timeout,
        "Configuration loaded"
    );

    let metrics = if config.observability.metrics_enabled {
        Some(metrics::install_recorder()?)
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let distribution = Arc::new(build_distribution(&config)?);
    spawn_signal_handler(shutdown.clone(), Arc::clone(&distribution));

    let internal_listener = TcpListener::bind(config.listener.internal_address()).await?;
    let config_listener = TcpListener::bind(config.listener.config_address()).await?;

    let admin = setup_admin_router(AdminState {
        distribution: Arc::clone(&distribution),
        metrics,
    });
    let internal = tokio::spawn(serve("internal", internal_listener, admin, shutdown.clone()));

    let server = HttpServer::new(AppState {
        distribution,
        shutdown: shutdown.clone(),
        port: config.listener.config_port,
    });
    let served = server.run(config_listener).await;

    // Stop the internal server too if the public one exited on its own.
    shutdown.trigger();
    internal.await??;
    served?;

    drop(inline);
    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "mock-apollo",
            "--file",
            "a.yaml",
            "--file",
            "b.yaml",
            "--config-port",
            "18070",
            "--poll-timeout",
            "30s",
        ])
        .unwrap();

        let mut config = ServerConfig {
            sources: vec![PathBuf::from("from-settings.yaml")],
            ..ServerConfig::default()
        };
        cli.apply(&mut config);

        assert_eq!(config.sources, vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]);
        assert_eq!(config.listener.config_port, 18070);
        assert_eq!(config.listener.internal_port, 9090);
        assert_eq!(config.poll_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let cli = Cli::try_parse_from(["mock-apollo"]).unwrap();
        let mut config = ServerConfig {
            sources: vec![PathBuf::from("from-settings.yaml")],
            ..ServerConfig::default()
        };
        cli.apply(&mut config);
        assert_eq!(config.sources, vec![PathBuf::from("from-settings.yaml")]);
    }
}
