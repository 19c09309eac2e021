//! API route configuration.

use crate::api::handlers::{health_handler, index_handler, redirect_handler, shorten_handler};
use crate::api::middleware::auth;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Link creation, protected by the secret token.
///
/// - `POST /new` - Create a short link
///
/// The auth layer is a route layer, so a wrong method gets `405` before any
/// token check.
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new().route(
        "/new",
        post(shorten_handler).route_layer(middleware::from_fn_with_state(state, auth::layer)),
    )
}

/// Public routes subject to canonical host enforcement.
///
/// - `GET /` - `400`, no identifier
/// - `GET /{identifier}` - Short link redirect
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/{identifier}", get(redirect_handler))
}

/// Liveness check, served for any `Host` so load balancers polling by
/// address are not redirected.
///
/// - `GET /health` - Store and reaper checks
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
