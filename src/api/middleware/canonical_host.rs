//! Redirects requests addressed to any host other than the canonical one.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::handlers::permanent_redirect;
use crate::state::AppState;
use crate::utils::canonical_host::extract_host_from_headers;

/// Answers `301` to the same path on the canonical host when the request's
/// `Host` header (or URI authority) does not designate it.
///
/// Disabled when [`AppState::enforce_canonical_host`] is false.
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    if !st.enforce_canonical_host {
        return next.run(req).await;
    }

    let host = extract_host_from_headers(req.headers())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .map(str::to_owned);

    if host.as_deref().is_some_and(|h| st.canonical_host.matches(h)) {
        return next.run(req).await;
    }

    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = st.canonical_host.redirect_target(path);

    debug!(host = ?host, %target, "Redirecting to canonical host");
    permanent_redirect(&target)
}
