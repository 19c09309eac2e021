//! DTOs for the link creation endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Creation request, form-encoded or multipart.
///
/// The `token` field is consumed by [`crate::api::middleware::auth`] and is
/// not part of this struct.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenForm {
    /// The URL to redirect to. Stored as-is.
    #[serde(default)]
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,

    /// Optional duration string (`90s`, `12h`, ...). Empty means absent.
    #[serde(default)]
    pub ttl: Option<String>,
}

impl ShortenForm {
    /// Builds the form from decoded multipart fields. The first occurrence
    /// of a name wins; unknown names are ignored.
    pub fn from_fields(fields: Vec<(String, String)>) -> Self {
        let mut url = None;
        let mut ttl = None;

        for (name, value) in fields {
            match name.as_str() {
                "url" if url.is_none() => url = Some(value),
                "ttl" if ttl.is_none() => ttl = Some(value),
                _ => {}
            }
        }

        Self {
            url: url.unwrap_or_default(),
            ttl,
        }
    }

    /// The TTL string, if one was actually supplied.
    pub fn ttl(&self) -> Option<&str> {
        self.ttl.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Successful creation response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    #[serde(rename = "short-url")]
    pub short_url: String,

    /// RFC 3339 instant after which the link stops resolving.
    pub expires: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_fields_first_value_wins() {
        let form = ShortenForm::from_fields(fields(&[
            ("token", "secret"),
            ("url", "https://a.example.com"),
            ("url", "https://b.example.com"),
        ]));

        assert_eq!(form.url, "https://a.example.com");
        assert_eq!(form.ttl(), None);
    }

    #[test]
    fn test_from_fields_missing_url_fails_validation() {
        let form = ShortenForm::from_fields(fields(&[("ttl", "5m")]));
        assert!(form.validate().is_err());
        assert_eq!(form.ttl(), Some("5m"));
    }

    #[test]
    fn test_blank_ttl_is_absent() {
        let form =
            ShortenForm::from_fields(fields(&[("url", "https://a.example.com"), ("ttl", "  ")]));
        assert_eq!(form.ttl(), None);
    }
}
