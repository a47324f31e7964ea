//! Snapshot data model and document parsing.
//!
//! The source document is a three-level mapping
//! `app id → cluster id → namespace id → namespace object`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Namespaces of one cluster, keyed by namespace id.
pub type NamespaceMap = BTreeMap<String, NamespaceConfig>;

/// Clusters of one app, keyed by cluster id.
pub type ClusterMap = BTreeMap<String, NamespaceMap>;

/// One namespace as stored in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamespaceConfig {
    /// Opaque version tag.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub release_key: String,

    /// Key/value configuration. `None` when the document omits it.
    #[serde(deserialize_with = "deserialize_properties", skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,

    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub yml: String,

    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub yaml: String,

    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub json: String,

    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub xml: String,
}

impl NamespaceConfig {
    /// Build a namespace carrying only properties.
    pub fn with_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: Some(
                properties
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }
}

/// One complete, immutable parse of a configuration source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    apps: BTreeMap<String, ClusterMap>,
}

/// Document shape as written, before `null` levels are normalized.
type RawDocument =
    BTreeMap<String, Option<BTreeMap<String, Option<BTreeMap<String, Option<NamespaceConfig>>>>>>;

impl ConfigSnapshot {
    /// Parse a YAML (or JSON) document into a snapshot.
    ///
    /// Only the structure is checked here; acceptance rules live in
    /// [`validate_snapshot`](super::validate_snapshot).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_yaml::Error> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let raw: Option<RawDocument> = serde_yaml::from_slice(bytes)?;
        let apps = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(app, clusters)| {
                let clusters = clusters
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(cluster, namespaces)| {
                        let namespaces = namespaces
                            .unwrap_or_default()
                            .into_iter()
                            .map(|(ns, config)| (ns, config.unwrap_or_default()))
                            .collect();
                        (cluster, namespaces)
                    })
                    .collect();
                (app, clusters)
            })
            .collect();

        Ok(Self { apps })
    }

    /// Look up one namespace by its full (app, cluster, namespace) key.
    pub fn namespace(&self, app: &str, cluster: &str, namespace: &str) -> Option<&NamespaceConfig> {
        self.apps.get(app)?.get(cluster)?.get(namespace)
    }

    /// All apps in the snapshot.
    pub fn apps(&self) -> &BTreeMap<String, ClusterMap> {
        &self.apps
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Total number of namespaces across all apps and clusters.
    pub fn namespace_count(&self) -> usize {
        self.apps
            .values()
            .flat_map(|clusters| clusters.values())
            .map(|namespaces| namespaces.len())
            .sum()
    }

    /// Insert a namespace, creating the app and cluster levels as needed.
    pub fn insert(
        &mut self,
        app: impl Into<String>,
        cluster: impl Into<String>,
        namespace: impl Into<String>,
        config: NamespaceConfig,
    ) {
        self.apps
            .entry(app.into())
            .or_default()
            .entry(cluster.into())
            .or_default()
            .insert(namespace.into(), config);
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `properties: ~` stays `None`; a `key: ~` entry becomes an empty string.
fn deserialize_properties<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|entries| {
        entries
            .into_iter()
            .map(|(key, value)| (key, value.unwrap_or_default()))
            .collect()
    }))
}
