//! Per-format projection of a namespace.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::distribution::error::DistributionError;
use crate::distribution::namespace::ConfigFormat;
use crate::snapshot::NamespaceConfig;

/// The `configurations` payload served for a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Configurations {
    /// Key/value properties, `null` when the namespace has none.
    Properties(Option<BTreeMap<String, String>>),
    /// A raw text blob wrapped as `{"content": ...}`.
    Content { content: String },
}

impl Configurations {
    fn content(blob: &str) -> Self {
        Configurations::Content {
            content: blob.to_string(),
        }
    }
}

impl ConfigFormat {
    /// Project `config` into this format.
    ///
    /// `.yml` and `.yaml` serve their own blob and fall back to the other one
    /// when it is empty.
    pub fn project(self, config: &NamespaceConfig) -> Configurations {
        match self {
            ConfigFormat::Properties => Configurations::Properties(config.properties.clone()),
            ConfigFormat::Yml => Configurations::content(first_non_empty(&config.yml, &config.yaml)),
            ConfigFormat::Yaml => Configurations::content(first_non_empty(&config.yaml, &config.yml)),
            ConfigFormat::Json => Configurations::content(&config.json),
            ConfigFormat::Xml => Configurations::content(&config.xml),
        }
    }
}

fn first_non_empty<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

/// Project `config` for an extension string such as `yml` or `.xml`.
pub fn project(config: &NamespaceConfig, format: &str) -> Result<Configurations, DistributionError> {
    let format: ConfigFormat = format.parse()?;
    Ok(format.project(config))
}
