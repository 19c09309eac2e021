//! Secret token authentication middleware.

use axum::{
    body::{Body, to_bytes},
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::api::extract::body_token;
use crate::{error::AppError, state::AppState};

/// Largest creation request body accepted.
pub const MAX_FORM_BYTES: usize = 64 * 1024;

/// Rejects requests that do not carry the configured secret token.
///
/// # Token Sources
///
/// 1. `Authorization: Bearer <token>` header, checked without touching the body
/// 2. `token` field of a form-encoded or multipart body
///
/// Without a Bearer header the body is buffered (at most [`MAX_FORM_BYTES`])
/// to read the field, then handed on unchanged. A body that cannot be read
/// within that limit carries no usable token.
///
/// # Errors
///
/// Returns `403 Forbidden` with an empty body if the token is missing or
/// does not match. The handler is never reached in that case.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::post, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/new", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    if let Ok(AuthBearer(token)) = AuthBearer::from_request_parts(&mut parts, &()).await {
        st.auth_service.authenticate(Some(&token))?;
        return Ok(next.run(Request::from_parts(parts, body)).await);
    }

    let bytes = match to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected request with unreadable body");
            return Err(AppError::forbidden());
        }
    };

    let token = body_token(&parts.headers, bytes.clone()).await;
    st.auth_service.authenticate(token.as_deref())?;

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}
