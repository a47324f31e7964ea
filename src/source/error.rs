//! Errors raised while loading a configuration source.

use std::io;

use thiserror::Error;

use crate::snapshot::ValidationError;

/// Why a load attempt was aborted. The previously published snapshot is
/// retained in every case.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {source_name}: {error}")]
    SourceUnreadable {
        source_name: String,
        #[source]
        error: io::Error,
    },

    #[error("malformed config document: {0}")]
    MalformedDocument(#[from] serde_yaml::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LoadError {
    /// Short label used for metrics and status output.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::SourceUnreadable { .. } => "unreadable",
            LoadError::MalformedDocument(_) => "malformed",
            LoadError::Validation(_) => "invalid",
        }
    }
}
