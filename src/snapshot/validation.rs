//! Snapshot acceptance rules.
//!
//! # Responsibilities
//! - Reject empty documents, empty keys, and empty apps/clusters
//! - Reject namespaces with no usable payload
//! - Report malformed inline yaml/json blobs without rejecting the load
//!
//! # Design Decisions
//! - Validation is a pure function over a parsed snapshot
//! - The first violation (in key order) is returned
//! - A namespace carrying only a `json` blob is rejected

use std::fmt;

use thiserror::Error;

use crate::snapshot::model::{ConfigSnapshot, NamespaceConfig};

/// Semantic rejection of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid config file")]
    EmptyDocument,

    #[error("invalid app name ''")]
    EmptyAppName,

    #[error("invalid app '{app}'")]
    EmptyApp { app: String },

    #[error("invalid cluster name '' in {app}")]
    EmptyClusterName { app: String },

    #[error("invalid cluster '{cluster}' in {app}")]
    EmptyCluster { app: String, cluster: String },

    #[error("invalid namespace name '' in {app}/{cluster}")]
    EmptyNamespaceName { app: String, cluster: String },

    #[error("invalid namespace '{namespace}' in {app}/{cluster}")]
    InvalidNamespace {
        app: String,
        cluster: String,
        namespace: String,
    },

    #[error("invalid config key '' in {app}/{cluster}/{namespace}")]
    EmptyConfigKey {
        app: String,
        cluster: String,
        namespace: String,
    },
}

/// Which inline blob failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Yml,
    Yaml,
    Json,
}

impl BlobKind {
    fn format_name(self) -> &'static str {
        match self {
            BlobKind::Yml | BlobKind::Yaml => "yaml",
            BlobKind::Json => "json",
        }
    }
}

/// Malformed inline content inside an otherwise accepted namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFormatWarning {
    pub app: String,
    pub cluster: String,
    pub namespace: String,
    pub blob: BlobKind,
    pub message: String,
}

impl fmt::Display for EmbeddedFormatWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to parse {} config for namespace '{}' in {}/{}: {}",
            self.blob.format_name(),
            self.namespace,
            self.app,
            self.cluster,
            self.message
        )
    }
}

/// Validate a parsed snapshot.
///
/// On acceptance returns the (possibly empty) list of embedded format
/// warnings; the caller decides how to surface them.
pub fn validate_snapshot(snapshot: &ConfigSnapshot) -> Result<Vec<EmbeddedFormatWarning>, ValidationError> {
    if snapshot.is_empty() {
        return Err(ValidationError::EmptyDocument);
    }

    let mut warnings = Vec::new();
    for (app, clusters) in snapshot.apps() {
        if app.is_empty() {
            return Err(ValidationError::EmptyAppName);
        }
        if clusters.is_empty() {
            return Err(ValidationError::EmptyApp { app: app.clone() });
        }

        for (cluster, namespaces) in clusters {
            if cluster.is_empty() {
                return Err(ValidationError::EmptyClusterName { app: app.clone() });
            }
            if namespaces.is_empty() {
                return Err(ValidationError::EmptyCluster {
                    app: app.clone(),
                    cluster: cluster.clone(),
                });
            }

            for (namespace, config) in namespaces {
                if namespace.is_empty() {
                    return Err(ValidationError::EmptyNamespaceName {
                        app: app.clone(),
                        cluster: cluster.clone(),
                    });
                }
                validate_namespace(app, cluster, namespace, config)?;
                check_embedded_blobs(app, cluster, namespace, config, &mut warnings);
            }
        }
    }

    Ok(warnings)
}

fn validate_namespace(
    app: &str,
    cluster: &str,
    namespace: &str,
    config: &NamespaceConfig,
) -> Result<(), ValidationError> {
    let has_payload = config.properties.is_some()
        || !config.yml.is_empty()
        || !config.yaml.is_empty()
        || !config.xml.is_empty();
    if !has_payload {
        return Err(ValidationError::InvalidNamespace {
            app: app.to_string(),
            cluster: cluster.to_string(),
            namespace: namespace.to_string(),
        });
    }

    let empty_key = config
        .properties
        .as_ref()
        .is_some_and(|props| props.contains_key(""));
    if empty_key {
        return Err(ValidationError::EmptyConfigKey {
            app: app.to_string(),
            cluster: cluster.to_string(),
            namespace: namespace.to_string(),
        });
    }

    Ok(())
}

fn check_embedded_blobs(
    app: &str,
    cluster: &str,
    namespace: &str,
    config: &NamespaceConfig,
    warnings: &mut Vec<EmbeddedFormatWarning>,
) {
    let mut warn = |blob: BlobKind, message: String| {
        let warning = EmbeddedFormatWarning {
            app: app.to_string(),
            cluster: cluster.to_string(),
            namespace: namespace.to_string(),
            blob,
            message,
        };
        tracing::warn!("{}", warning);
        warnings.push(warning);
    };

    for (blob, content) in [(BlobKind::Yml, &config.yml), (BlobKind::Yaml, &config.yaml)] {
        if content.is_empty() {
            continue;
        }
        if let Err(e) = serde_yaml::from_str::<serde_yaml::Mapping>(content) {
            warn(blob, e.to_string());
        }
    }

    if !config.json.is_empty() {
        if let Err(e) = serde_json::from_str::<Vec<serde_json::Map<String, serde_json::Value>>>(&config.json) {
            warn(BlobKind::Json, e.to_string());
        }
    }
}
