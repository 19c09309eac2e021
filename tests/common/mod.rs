#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use chrono::TimeDelta;
use ephemeral_shortener::application::services::AuthService;
use ephemeral_shortener::domain::{ExpiringStore, Identifier, ReaperStats};
use ephemeral_shortener::routes::app_router;
use ephemeral_shortener::state::AppState;
use ephemeral_shortener::utils::canonical_host::CanonicalHost;

pub const CANONICAL_HOST: &str = "https://s.example.com";
pub const TEST_TOKEN: &str = "test-token";
// sha256("test-token")
pub const TEST_TOKEN_SHA256: &str =
    "4c5dc9b7708905f77f5e5d16316b5dfb425e68cb326dcd55a860e90a7707031e";

pub fn create_test_state(enforce_canonical_host: bool) -> AppState {
    create_test_state_with(
        TimeDelta::minutes(60),
        Arc::new(ReaperStats::new(Duration::from_secs(30))),
        enforce_canonical_host,
    )
}

pub fn create_test_state_with(
    default_ttl: TimeDelta,
    reaper_stats: Arc<ReaperStats>,
    enforce_canonical_host: bool,
) -> AppState {
    let store = Arc::new(ExpiringStore::new(default_ttl));
    let canonical_host = CanonicalHost::parse(CANONICAL_HOST).unwrap();

    AppState::new(
        store,
        AuthService::new(TEST_TOKEN_SHA256),
        reaper_stats,
        canonical_host,
        enforce_canonical_host,
    )
}

/// Full application router on the mock transport.
pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(app_router(state)).unwrap()
}

pub fn insert_link(state: &AppState, id: &str, url: &str) {
    state.store().insert(Identifier::from(id), url, None);
}
