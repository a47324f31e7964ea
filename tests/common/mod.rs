//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use mock_apollo::longpoll::PollRegistry;
use mock_apollo::source::{ConfigSource, ManualDetector, MemorySource};
use mock_apollo::Distribution;

/// A document with two namespaces, including embedded blobs that are
/// malformed on purpose (they only produce warnings).
pub const STUB_CONFIG: &str = r#"
app:
  cluster:
    ns:
      releaseKey: abc
      properties:
        mysql: "mysql://root@localhost/mysql"
      yaml: "spring:\n  datasource:\n    dynamic:\n      p6spy: false\n      primary: master\n"
      yml: "spring:\n  datasource:\n    dynamic:\n\t\t  p6spy: false\n      primary: master\n"
      json: "[\n{\n\t\t\"abc\":\"lbs-test\",\n},\n{\n\t\t\"def\":\"456\",\n}\n]\n"
    ns2:
      releaseKey: abc
      properties: {}
      yml: "[raw]\nkey = value\n"
      yaml: "[raw]\nkey = value\n"
      xml: plain text
      json: "[raw]\nkey = value\n"
"#;

pub const STUB_YAML_BLOB: &str = "spring:\n  datasource:\n    dynamic:\n      p6spy: false\n      primary: master\n";
pub const STUB_YML_BLOB: &str = "spring:\n  datasource:\n    dynamic:\n\t\t  p6spy: false\n      primary: master\n";

/// A single-namespace document whose property `a` is `value`.
pub fn simple_config(value: &str) -> String {
    format!("app:\n  cluster:\n    ns:\n      releaseKey: r-{value}\n      properties:\n        a: {value}\n")
}

/// Write `content` to `dir/name` and return the path.
pub fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// A distribution over one in-memory source that only changes on trigger.
pub fn memory_distribution(content: &str, poll_timeout: Duration) -> (Arc<Distribution>, Arc<MemorySource>) {
    let memory = Arc::new(MemorySource::with_content("memory", content));
    let source: Arc<dyn ConfigSource> = memory.clone();
    let mut distribution = Distribution::new(poll_timeout);
    distribution
        .add_source(source, Box::new(ManualDetector), Duration::from_secs(1))
        .unwrap();
    (Arc::new(distribution), memory)
}

/// Wait until exactly `count` long polls are pending.
pub async fn wait_for_pending(registry: &PollRegistry, count: usize) {
    for _ in 0..400 {
        if registry.pending_count() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {count} pending polls, found {}",
        registry.pending_count()
    );
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Path and query of a long poll carrying `raw` as its notifications.
pub fn notifications_uri(raw: &str) -> String {
    let url = reqwest::Url::parse_with_params(
        "http://localhost/notifications/v2",
        &[("notifications", raw)],
    )
    .unwrap();
    format!("{}?{}", url.path(), url.query().unwrap_or_default())
}
