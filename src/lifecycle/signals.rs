//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal actions (shutdown, reload)

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::distribution::Distribution;
use crate::lifecycle::shutdown::Shutdown;

/// Spawn the task that turns OS signals into shutdown and reload actions.
pub fn spawn_signal_handler(shutdown: Shutdown, distribution: Arc<Distribution>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = listen(&shutdown, &distribution).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    })
}

#[cfg(unix)]
async fn listen(shutdown: &Shutdown, distribution: &Arc<Distribution>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!(signal = "SIGINT", "Shutdown signal received");
                break;
            }
            _ = terminate.recv() => {
                tracing::info!(signal = "SIGTERM", "Shutdown signal received");
                break;
            }
            _ = hangup.recv() => {
                tracing::info!(signal = "SIGHUP", "Reloading all sources");
                reload(Arc::clone(distribution)).await;
            }
        }
    }

    shutdown.trigger();
    Ok(())
}

#[cfg(not(unix))]
async fn listen(shutdown: &Shutdown, _distribution: &Arc<Distribution>) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
    Ok(())
}

#[cfg(unix)]
async fn reload(distribution: Arc<Distribution>) {
    let reports = match tokio::task::spawn_blocking(move || distribution.reload_all()).await {
        Ok(reports) => reports,
        Err(e) => {
            tracing::error!(error = %e, "Reload on SIGHUP aborted");
            return;
        }
    };
    for report in reports {
        if let Some(error) = report.error {
            tracing::warn!(source = %report.source, error = %error, "Reload on SIGHUP failed");
        }
    }
}
