//! Handlers of the public config API.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::distribution::project;
use crate::http::request::NotificationsQuery;
use crate::http::response::{ConfigResponse, ServiceInstance};
use crate::http::server::AppState;
use crate::longpoll::PollOutcome;
use crate::observability::metrics;

/// `GET /configs/{appId}/{cluster}/{namespace}`
pub async fn query_config(
    State(state): State<AppState>,
    Path((app_id, cluster, namespace)): Path<(String, String, String)>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    match state.distribution.query(&app_id, &cluster, &namespace) {
        Ok(found) => {
            metrics::record_request("configs", 200);
            tracing::debug!(uri = %uri, "Served config");
            Json(ConfigResponse::from(found)).into_response()
        }
        Err(e) => {
            metrics::record_request("configs", 404);
            tracing::warn!(uri = %uri, error = %e, "No namespace for request");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// `GET /configfiles/{format}/{appId}/{cluster}/{namespace}`
///
/// `json` serves the namespace in the format named by its own extension;
/// any other `format` names the projection explicitly.
pub async fn query_config_file(
    State(state): State<AppState>,
    Path((format, app_id, cluster, namespace)): Path<(String, String, String, String)>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let found = match state.distribution.query(&app_id, &cluster, &namespace) {
        Ok(found) => found,
        Err(e) => {
            metrics::record_request("configfiles", 404);
            tracing::warn!(uri = %uri, error = %e, "No namespace for request");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let configurations = if format == "json" {
        Ok(found.configurations())
    } else {
        project(&found.config, &format)
    };

    match configurations {
        Ok(configurations) => {
            metrics::record_request("configfiles", 200);
            tracing::debug!(uri = %uri, "Served config file");
            Json(configurations).into_response()
        }
        Err(e) => {
            metrics::record_request("configfiles", 404);
            tracing::warn!(uri = %uri, error = %e, "No config for request");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// `GET /services/config`
pub async fn query_service(State(state): State<AppState>) -> Json<Vec<ServiceInstance>> {
    metrics::record_request("services", 200);
    Json(vec![ServiceInstance::config_service(state.port)])
}

/// `GET /notifications/v2`
///
/// Held open until a source changes (200, request echoed), the poll timeout
/// passes or the server shuts down (304, empty body).
pub async fn long_polling(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let Some(notifications) = query.parse() else {
        metrics::record_request("notifications", 400);
        tracing::warn!(uri = %uri, "Invalid long poll request");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let outcome = state
        .distribution
        .long_poll(notifications, state.shutdown.cancelled())
        .await;

    match outcome {
        PollOutcome::Changed(notifications) => {
            metrics::record_request("notifications", 200);
            tracing::debug!(uri = %uri, "Served poll with changes");
            Json(notifications).into_response()
        }
        PollOutcome::Unchanged => {
            metrics::record_request("notifications", 304);
            StatusCode::NOT_MODIFIED.into_response()
        }
    }
}

/// `GET /healthz`: takes the poll registry lock, so a deadlock shows up here.
pub async fn healthz(State(state): State<AppState>) -> &'static str {
    let _pending = state.distribution.registry().pending_count();
    "OK"
}

/// Fallback for every unmatched path.
pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, &'static str) {
    metrics::record_request("unmatched", 404);
    tracing::warn!(method = %method, uri = %uri, "HTTP path not found");
    (StatusCode::NOT_FOUND, "path not found")
}
