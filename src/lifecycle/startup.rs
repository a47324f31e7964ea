//! Startup orchestration.
//!
//! # Responsibilities
//! - Materialize an inline configuration document from the environment
//! - Start one watcher per configured source, in order
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The inline document always becomes the first source

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ServerConfig;
use crate::distribution::Distribution;
use crate::source::LoadError;

/// Environment variable holding an inline configuration document.
pub const ENV_CONF_VALUE: &str = "MOCK_APOLLO_CONF_VALUE";
/// Fallback for [`ENV_CONF_VALUE`].
pub const ENV_CONF: &str = "MOCK_APOLLO_CONF";
/// Extension of the inline document's temp file, `yaml` by default.
pub const ENV_CONF_TYPE: &str = "MOCK_APOLLO_CONF_TYPE";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to write inline config to {path}: {source}")]
    InlineSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load source '{path}': {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

/// Inline configuration written to a temp file.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct InlineSource {
    path: PathBuf,
}

impl InlineSource {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InlineSource {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "Failed to remove inline config");
        }
    }
}

/// Write the inline document named by the environment lookup `var`, if any,
/// to `dir/mock_<uuid>.<ext>`.
///
/// `var` abstracts `std::env::var` so the lookup can be exercised in tests.
pub fn materialize_inline_source<F>(dir: &Path, var: F) -> Result<Option<InlineSource>, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| var(name).filter(|value| !value.is_empty());
    let Some(document) = non_empty(ENV_CONF_VALUE).or_else(|| non_empty(ENV_CONF)) else {
        return Ok(None);
    };
    let ext = non_empty(ENV_CONF_TYPE).unwrap_or_else(|| "yaml".to_string());

    let path = dir.join(format!("mock_{}.{}", uuid::Uuid::new_v4().simple(), ext));
    let write = || -> std::io::Result<()> {
        let mut file = std::fs::File::create_new(&path)?;
        file.write_all(document.as_bytes())?;
        file.sync_all()
    };
    write().map_err(|source| StartupError::InlineSource {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Inline config written from environment");
    Ok(Some(InlineSource { path }))
}

/// Start a watcher for every source in `config`, in order.
///
/// Must be called within a Tokio runtime.
pub fn build_distribution(config: &ServerConfig) -> Result<Distribution, StartupError> {
    let mut distribution = Distribution::new(config.poll_timeout);
    for path in &config.sources {
        distribution
            .watch_file(path.clone(), config.watch_interval)
            .map_err(|source| StartupError::Load {
                path: path.clone(),
                source,
            })?;
    }
    tracing::info!(
        sources = distribution.source_count(),
        poll_timeout = ?config.poll_timeout,
        "Distribution ready"
    );
    Ok(distribution)
}
