//! Handler for link creation endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::ShortenResponse;
use crate::api::extract::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::duration::parse_duration;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /new` (`application/x-www-form-urlencoded` or `multipart/form-data`)
///
/// The token has already been checked by [`crate::api::middleware::auth`].
///
/// # Request Body
///
/// ```text
/// token=<secret>&url=https%3A%2F%2Fexample.com&ttl=12h
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short-url": "https://s.example.com/k3j9a0zq",
///   "expires": "2026-01-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400` if the body is not a form, `url` is empty or `ttl` is invalid
/// - `500` if no identifier could be reserved
pub async fn shorten_handler(
    State(state): State<AppState>,
    ShortenRequest(form): ShortenRequest,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    form.validate()?;

    let ttl = form
        .ttl()
        .map(parse_duration)
        .transpose()
        .map_err(|e| AppError::bad_request(format!("invalid ttl: {e}")))?;

    let created = state.link_service.create_short_link(form.url, ttl)?;

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_url: created.short_url,
            expires: created.expires_at,
        }),
    ))
}
