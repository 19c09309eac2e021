mod common;

use std::net::SocketAddr;

use chrono::{TimeDelta, Utc};
use ephemeral_shortener::client::{ClientError, ShortenClient};
use ephemeral_shortener::routes::app_router;
use ephemeral_shortener::state::AppState;
use reqwest::StatusCode;

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app_router(state)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_client_shorten_success() {
    let state = common::create_test_state(false);
    let addr = spawn_server(state.clone()).await;

    let client = ShortenClient::new(&format!("http://{addr}/new"), common::TEST_TOKEN).unwrap();
    let before = Utc::now();
    let short = client
        .shorten("https://example.com/long/path", TimeDelta::hours(12))
        .await
        .unwrap();

    assert_eq!(short.short_url.host_str(), Some("s.example.com"));
    assert_eq!(short.original.as_str(), "https://example.com/long/path");
    assert!(short.expires >= before + TimeDelta::hours(12) - TimeDelta::seconds(1));

    let identifier = short.short_url.path().trim_start_matches('/');
    assert_eq!(
        state.store().lookup(identifier).unwrap().value,
        "https://example.com/long/path"
    );
}

#[tokio::test]
async fn test_client_wrong_token() {
    let state = common::create_test_state(false);
    let addr = spawn_server(state.clone()).await;

    let client = ShortenClient::new(&format!("http://{addr}/new"), "wrong").unwrap();
    let result = client
        .shorten("https://example.com", TimeDelta::hours(1))
        .await;

    match result {
        Err(ClientError::Server { status, .. }) => assert_eq!(status, StatusCode::FORBIDDEN),
        other => panic!("expected 403, got {other:?}"),
    }
    assert!(state.store().is_empty());
}

#[tokio::test]
async fn test_client_reports_server_message() {
    let state = common::create_test_state(false);
    let addr = spawn_server(state).await;

    let client = ShortenClient::new(&format!("http://{addr}/new"), common::TEST_TOKEN).unwrap();
    let result = client
        .shorten("https://example.com", TimeDelta::seconds(-5))
        .await;

    match result {
        Err(ClientError::Server { status, message }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(!message.is_empty());
        }
        other => panic!("expected 400, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ShortenClient::new(&format!("http://{addr}/new"), common::TEST_TOKEN).unwrap();
    let result = client
        .shorten("https://example.com", TimeDelta::hours(1))
        .await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
}
