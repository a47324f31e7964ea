//! Request handling helpers.
//!
//! # Responsibilities
//! - Expose the request ID assigned by the request-id layer
//! - Build the per-request tracing span
//! - Decode the long-poll query string

use axum::body::Body;
use axum::http::{HeaderMap, Request};
use serde::Deserialize;

use crate::longpoll::{parse_notifications, Notification};

/// Header carrying the request ID, set on the way in and echoed on the way out.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID of a request, or `unknown` if the layer did not run.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

pub fn make_request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request.headers()),
    )
}

/// Query string of `GET /notifications/v2`.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationsQuery {
    pub notifications: Option<String>,
}

impl NotificationsQuery {
    /// The decoded notification list; `None` when missing or not a JSON array
    /// of notifications.
    pub fn parse(&self) -> Option<Vec<Notification>> {
        let raw = self.notifications.as_deref()?;
        match parse_notifications(raw) {
            Ok(notifications) => Some(notifications),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid notifications parameter");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_fallback() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, "abc".parse().unwrap());
        assert_eq!(request_id(&headers), "abc");
    }

    #[test]
    fn test_notifications_query() {
        let missing = NotificationsQuery::default();
        assert!(missing.parse().is_none());

        let bad = NotificationsQuery {
            notifications: Some("[{".into()),
        };
        assert!(bad.parse().is_none());

        let good = NotificationsQuery {
            notifications: Some(r#"[{"namespaceName":"ns","notificationId":3}]"#.into()),
        };
        assert_eq!(good.parse().unwrap(), vec![Notification::new("ns", 3)]);
    }
}
