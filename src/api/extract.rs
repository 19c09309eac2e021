//! Request body extraction for the creation endpoint.
//!
//! Creation requests arrive either `application/x-www-form-urlencoded`
//! (`curl -d`) or `multipart/form-data` (`curl -F`). Both carry the same
//! `token`, `url` and `ttl` text fields.

use axum::{
    body::{Body, Bytes},
    extract::{Form, FromRequest, Multipart, Request},
    http::{HeaderMap, header},
};

use crate::api::dto::shorten::ShortenForm;
use crate::error::AppError;

/// Form body of `POST /new`, in either encoding.
#[derive(Debug)]
pub struct ShortenRequest(pub ShortenForm);

impl<S> FromRequest<S> for ShortenRequest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(req.headers()) {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            let fields = collect_fields(multipart).await?;
            return Ok(Self(ShortenForm::from_fields(fields)));
        }

        let Form(form) = Form::<ShortenForm>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        Ok(Self(form))
    }
}

pub fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            v.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

/// Reads the `token` field from an already buffered body.
pub async fn body_token(headers: &HeaderMap, body: Bytes) -> Option<String> {
    if !is_multipart(headers) {
        return url::form_urlencoded::parse(&body)
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned());
    }

    let mut req = Request::new(Body::from(body));
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        req.headers_mut()
            .insert(header::CONTENT_TYPE, content_type.clone());
    }

    let multipart = Multipart::from_request(req, &()).await.ok()?;
    collect_fields(multipart)
        .await
        .ok()?
        .into_iter()
        .find(|(name, _)| name == "token")
        .map(|(_, value)| value)
}

/// Named text fields in order. Unnamed parts are skipped.
async fn collect_fields(mut multipart: Multipart) -> Result<Vec<(String, String)>, AppError> {
    let mut fields = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        fields.push((name, value));
    }

    Ok(fields)
}
