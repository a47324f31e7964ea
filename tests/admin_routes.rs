//! Internal control API tests.

use std::time::Duration;

use axum::http::StatusCode;
use mock_apollo::admin::{setup_admin_router, AdminState};
use mock_apollo::longpoll::Notification;
use mock_apollo::observability::metrics;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_status_reports_sources() {
    let (distribution, _source) = common::memory_distribution(common::STUB_CONFIG, Duration::from_secs(60));
    let router = setup_admin_router(AdminState {
        distribution,
        metrics: None,
    });

    let response = router.oneshot(common::get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let status = common::body_json(response).await;
    assert_eq!(status["pending_polls"], 0);
    assert_eq!(status["poll_timeout"], "1m");
    assert_eq!(status["sources"][0]["source"], "memory");
    assert_eq!(status["sources"][0]["published"], true);
    assert_eq!(status["sources"][0]["namespaces"], 2);
    assert!(status["sources"][0]["last_error"].is_null());
}

#[tokio::test]
async fn test_reload_reports_failures() {
    let (distribution, source) = common::memory_distribution(common::STUB_CONFIG, Duration::from_secs(60));
    let router = setup_admin_router(AdminState {
        distribution: distribution.clone(),
        metrics: None,
    });

    let response = router.clone().oneshot(common::post("/reload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await[0]["ok"], true);

    source.set("{}");
    let response = router.oneshot(common::post("/reload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let reports = common::body_json(response).await;
    assert_eq!(reports[0]["error"], "invalid config file");

    // The previous snapshot is still served.
    assert!(distribution.query("app", "cluster", "ns").is_ok());
}

#[tokio::test]
async fn test_trigger_wakes_polls() {
    let (distribution, _source) = common::memory_distribution(common::STUB_CONFIG, Duration::from_secs(30));
    let router = setup_admin_router(AdminState {
        distribution: distribution.clone(),
        metrics: None,
    });

    let poll = {
        let distribution = distribution.clone();
        tokio::spawn(async move {
            distribution
                .long_poll(vec![Notification::new("ns", 1)], std::future::pending())
                .await
        })
    };
    common::wait_for_pending(distribution.registry(), 1).await;

    let response = router.oneshot(common::post("/trigger")).await.unwrap();
    assert_eq!(common::body_json(response).await["triggered"], 1);

    let outcome = tokio::time::timeout(Duration::from_secs(5), poll)
        .await
        .unwrap()
        .unwrap();
    assert!(outcome.is_changed());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let handle = metrics::install_recorder().unwrap();
    let (distribution, _source) = common::memory_distribution(common::STUB_CONFIG, Duration::from_secs(60));
    let router = setup_admin_router(AdminState {
        distribution,
        metrics: Some(handle),
    });

    let response = router.clone().oneshot(common::get("/healthz")).await.unwrap();
    assert_eq!(common::body_bytes(response).await, b"OK");

    let response = router.oneshot(common::get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(common::body_bytes(response).await).unwrap();
    assert!(body.contains("apollo_source_reloads_total"), "{body}");
}

#[tokio::test]
async fn test_metrics_disabled() {
    let (distribution, _source) = common::memory_distribution(common::STUB_CONFIG, Duration::from_secs(60));
    let router = setup_admin_router(AdminState {
        distribution,
        metrics: None,
    });

    let response = router.oneshot(common::get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
