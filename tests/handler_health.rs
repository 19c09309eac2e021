mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, StatusCode, header};
use axum::{Router, routing::get};
use axum_test::TestServer;
use chrono::TimeDelta;
use ephemeral_shortener::api::handlers::health_handler;
use ephemeral_shortener::domain::ReaperStats;

#[tokio::test]
async fn test_health_endpoint_success() {
    let state = common::create_test_state(false);
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["reaper"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let state = common::create_test_state(false);
    common::insert_link(&state, "abcd1234", "https://example.com");
    let server = common::create_test_server(state);

    let response = server.get("/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("reaper").is_some());
    assert!(
        json["checks"]["store"]["message"]
            .as_str()
            .unwrap()
            .starts_with("1 entries")
    );
}

#[tokio::test]
async fn test_health_degraded_when_reaper_stalled() {
    // never cycled, and three 1ms intervals pass before the request
    let stats = Arc::new(ReaperStats::new(Duration::from_millis(1)));
    let state = common::create_test_state_with(TimeDelta::minutes(60), stats, false);
    let server = common::create_test_server(state);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["reaper"]["status"], "error");
}

#[tokio::test]
async fn test_health_not_redirected_to_canonical_host() {
    let state = common::create_test_state(true);
    let server = common::create_test_server(state);

    let response = server
        .get("/health")
        .add_header(header::HOST, HeaderValue::from_static("10.0.0.7:3000"))
        .await;

    response.assert_status_ok();
}
