//! Response shapes of the Apollo config service API.

use serde::Serialize;

use crate::distribution::{Configurations, NamespaceQuery};

/// Body of `GET /configs/{appId}/{cluster}/{namespace}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub app_id: String,
    pub cluster: String,
    #[serde(rename = "namespaceName")]
    pub namespace: String,
    pub release_key: String,
    pub configurations: Configurations,
}

impl From<NamespaceQuery> for ConfigResponse {
    fn from(query: NamespaceQuery) -> Self {
        let configurations = query.configurations();
        Self {
            app_id: query.app,
            cluster: query.cluster,
            namespace: query.namespace,
            release_key: query.config.release_key,
            configurations,
        }
    }
}

/// One entry of `GET /services/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    pub app_name: String,
    pub instance_id: String,
    pub homepage_url: String,
}

impl ServiceInstance {
    /// The single config service instance, reachable on `port`.
    pub fn config_service(port: u16) -> Self {
        Self {
            app_name: "APOLLO-CONFIGSERVICE".to_string(),
            instance_id: format!("localhost:apollo-configservice:{port}"),
            homepage_url: format!("http://localhost:{port}/"),
        }
    }
}
