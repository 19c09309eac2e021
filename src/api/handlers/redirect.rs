//! Handlers resolving short identifiers.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::canonical_host::CanonicalHost;

/// Anchor shown to user agents that do not follow redirects.
#[derive(Template)]
#[template(path = "redirect.html")]
pub struct RedirectTemplate<'a> {
    pub target: &'a str,
}

/// Redirects an identifier to its stored URL.
///
/// # Endpoint
///
/// `GET /{identifier}`
///
/// Expired entries are reported as missing even if the reaper has not yet
/// removed them.
///
/// # Errors
///
/// Returns 404 Not Found if the identifier is unknown or expired.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Response, AppError> {
    let target = state.link_service.resolve(&identifier)?;
    Ok(permanent_redirect(&target))
}

/// `GET /` carries no identifier.
pub async fn index_handler() -> AppError {
    AppError::bad_request("missing identifier")
}

/// Sends any request of the plain HTTP listener to the same path on the
/// canonical host.
pub async fn canonical_redirect_handler(
    State(canonical_host): State<CanonicalHost>,
    uri: Uri,
) -> Response {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    permanent_redirect(&canonical_host.redirect_target(path))
}

/// `301 Moved Permanently` with an HTML anchor for clients that do not
/// follow redirects.
pub fn permanent_redirect(target: &str) -> Response {
    let Some(location) = location_header(target) else {
        return AppError::internal(format!("Cannot redirect to {target:?}")).into_response();
    };

    let body = match (RedirectTemplate { target }).render() {
        Ok(body) => body,
        Err(e) => return AppError::internal(format!("Template error: {e}")).into_response(),
    };

    (
        StatusCode::MOVED_PERMANENTLY,
        [
            (header::LOCATION, location),
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
        ],
        body,
    )
        .into_response()
}

/// ASCII values are sent as stored. Anything else goes out percent-encoded,
/// since raw UTF-8 in a header is read as Latin-1 by some clients.
fn location_header(target: &str) -> Option<HeaderValue> {
    let raw = || HeaderValue::from_str(target).ok();
    let encoded = || {
        Url::parse(target)
            .ok()
            .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
    };

    if target.is_ascii() {
        raw().or_else(encoded)
    } else {
        encoded().or_else(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_redirect_headers() {
        let response = permanent_redirect("https://example.com/a?b=c");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/a?b=c"
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_location_header_percent_encodes_unicode() {
        let value = location_header("https://example.com/straße").unwrap();
        assert_eq!(value, "https://example.com/stra%C3%9Fe");
    }

    #[test]
    fn test_location_header_keeps_ascii_as_stored() {
        let value = location_header("https://example.com").unwrap();
        assert_eq!(value, "https://example.com");
    }

    #[test]
    fn test_permanent_redirect_encodes_unicode_location() {
        let response = permanent_redirect("https://example.com/caf\u{e9}?q=\u{fc}");
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/caf%C3%A9?q=%C3%BC"
        );
    }

    #[test]
    fn test_redirect_template_escapes_target() {
        let body = RedirectTemplate {
            target: r#"https://x.test/"><script>&'"#,
        }
        .render()
        .unwrap();

        assert!(body.starts_with(r#"<a href="https://x.test/"#));
        assert!(body.ends_with(r#"">Redirecting...</a>"#));
        assert!(body.contains("&lt;script&gt;&amp;"));
        assert!(!body.contains("<script>"));
        assert!(!body.contains("'"));
    }

    #[test]
    fn test_redirect_template_plain_url() {
        let body = RedirectTemplate {
            target: "https://example.com/a?b=c",
        }
        .render()
        .unwrap();

        assert_eq!(
            body,
            r#"<a href="https://example.com/a?b=c">Redirecting...</a>"#
        );
    }

    #[test]
    fn test_location_header_rejects_unusable_value() {
        assert!(location_header("not a url\n").is_none());
    }
}
