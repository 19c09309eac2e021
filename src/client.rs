//! Client for the link creation endpoint.
//!
//! ```rust,no_run
//! use chrono::TimeDelta;
//! use ephemeral_shortener::client::ShortenClient;
//!
//! # async fn demo() -> Result<(), ephemeral_shortener::client::ClientError> {
//! let client = ShortenClient::new("https://s.example.com/new", "my-secret")?;
//! let short = client.shorten("https://example.com/long/path", TimeDelta::hours(12)).await?;
//! println!("{} (valid until {})", short.short_url, short.expires);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::utils::duration::format_duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: StatusCode, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A short link returned by the server.
#[derive(Debug, Clone)]
pub struct ShortUrl {
    pub short_url: Url,
    pub original: Url,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(rename = "short-url", default)]
    short_url: Option<String>,
    #[serde(default)]
    expires: Option<DateTime<Utc>>,
}

/// Posts new links to a running server.
#[derive(Debug, Clone)]
pub struct ShortenClient {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl ShortenClient {
    /// Creates a client verifying TLS certificates.
    ///
    /// # Errors
    ///
    /// Fails if `endpoint` is not a valid URL or the HTTP client cannot be built.
    pub fn new(endpoint: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::build(endpoint, token.into(), false)
    }

    /// Creates a client accepting any TLS certificate, for self-signed setups.
    ///
    /// # Errors
    ///
    /// See [`ShortenClient::new`].
    pub fn insecure(endpoint: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::build(endpoint, token.into(), true)
    }

    fn build(endpoint: &str, token: String, insecure: bool) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint)?;
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// Requests a short link for `long_url` living for `ttl`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidUrl`] if `long_url` does not parse
    /// - [`ClientError::Transport`] on connection failures
    /// - [`ClientError::Server`] for non-success statuses, with the server's
    ///   `error` message when it sent one
    /// - [`ClientError::Malformed`] if a success response lacks fields
    pub async fn shorten(&self, long_url: &str, ttl: TimeDelta) -> Result<ShortUrl, ClientError> {
        let original = Url::parse(long_url)?;
        let ttl = format_duration(ttl);

        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[
                ("token", self.token.as_str()),
                ("url", original.as_str()),
                ("ttl", ttl.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let parsed: Option<CreateResponse> = serde_json::from_slice(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.error)
                .or_else(|| status.canonical_reason().map(str::to_owned))
                .unwrap_or_default();
            return Err(ClientError::Server { status, message });
        }

        let parsed =
            parsed.ok_or_else(|| ClientError::Malformed("response is not JSON".to_string()))?;

        if let Some(message) = parsed.error {
            return Err(ClientError::Server { status, message });
        }

        let short_url = parsed
            .short_url
            .ok_or_else(|| ClientError::Malformed("missing short-url".to_string()))?;
        let expires = parsed
            .expires
            .ok_or_else(|| ClientError::Malformed("missing expires".to_string()))?;

        Ok(ShortUrl {
            short_url: Url::parse(&short_url)?,
            original,
            expires,
        })
    }
}
