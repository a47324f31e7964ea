//! Client notification requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One `(namespaceName, notificationId)` entry sent by a client.
///
/// The entry is held as the client sent it, so it is echoed back verbatim:
/// absent fields stay absent and ids keep their original JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notification(Map<String, Value>);

impl Notification {
    pub fn new(namespace_name: impl Into<String>, notification_id: i64) -> Self {
        let mut fields = Map::new();
        fields.insert("namespaceName".to_string(), Value::String(namespace_name.into()));
        fields.insert("notificationId".to_string(), Value::from(notification_id));
        Self(fields)
    }

    pub fn namespace_name(&self) -> Option<&str> {
        self.0.get("namespaceName").and_then(Value::as_str)
    }

    /// The client's last known id, when it sent a numeric one.
    pub fn notification_id(&self) -> Option<i64> {
        self.0.get("notificationId").and_then(Value::as_i64)
    }
}

/// Parse the JSON array carried in the `notifications` query parameter.
///
/// Each element must be an object; its fields are not interpreted.
pub fn parse_notifications(raw: &str) -> Result<Vec<Notification>, serde_json::Error> {
    serde_json::from_str(raw)
}
