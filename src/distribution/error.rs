//! Read-path outcomes of the distribution facade.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    #[error("namespace '{namespace}' not found in {app}/{cluster}")]
    NamespaceNotFound {
        app: String,
        cluster: String,
        namespace: String,
    },

    #[error("non-support format '{0}'")]
    FormatNotSupported(String),
}

impl DistributionError {
    pub(crate) fn not_found(app: &str, cluster: &str, namespace: &str) -> Self {
        DistributionError::NamespaceNotFound {
            app: app.to_string(),
            cluster: cluster.to_string(),
            namespace: namespace.to_string(),
        }
    }
}
