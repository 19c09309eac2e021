//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /new`           - Create a short link (secret token required)
//! - `GET  /{identifier}`  - Short link redirect (public)
//! - `GET  /health`        - Health check: store, reaper (public, any host)
//! - `GET  /`              - 400, no identifier
//!
//! # Middleware
//!
//! Applied outermost first:
//!
//! - **Tracing** - Structured request/response logging
//! - **Canonical host** - Redirects other hosts to the canonical one, except
//!   for `/health`
//! - **Method** - `405` from the router for unsupported methods
//! - **Authentication** - Secret token on `POST /new`
//!
//! [`redirect_router`] serves the optional plain HTTP listener, which only
//! redirects to the canonical host.

use crate::api;
use crate::api::handlers::canonical_redirect_handler;
use crate::api::middleware::{canonical_host, tracing};
use crate::state::AppState;
use crate::utils::canonical_host::CanonicalHost;
use axum::{Router, middleware};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(api::routes::protected_routes(state.clone()))
        .merge(api::routes::public_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            canonical_host::layer,
        ))
        .merge(api::routes::health_routes())
        .with_state(state)
        .layer(tracing::layer())
}

/// Router answering every request with `301` to the canonical host.
pub fn redirect_router(canonical_host: CanonicalHost) -> Router {
    Router::new()
        .fallback(canonical_redirect_handler)
        .with_state(canonical_host)
        .layer(tracing::layer())
}
