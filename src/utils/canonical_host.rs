//! The externally advertised base URL and matching of request `Host` headers.

use axum::http::{HeaderMap, header};
use url::Url;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CanonicalHostError {
    #[error("Invalid canonical host: {0}")]
    InvalidUrl(String),

    #[error("Canonical host must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("Canonical host must not contain a path, query or fragment")]
    UnexpectedComponents,
}

/// Base URL used to build short links and to redirect stray hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHost {
    /// Scheme and authority, without a trailing slash.
    base: String,
    host: String,
    port: u16,
}

impl CanonicalHost {
    /// Parses a base URL such as `https://s.example.com` or `http://localhost:3000`.
    ///
    /// # Errors
    ///
    /// Fails for unparsable URLs, non-HTTP(S) schemes, missing hosts and URLs
    /// carrying a path, query or fragment.
    pub fn parse(raw: &str) -> Result<Self, CanonicalHostError> {
        let url = Url::parse(raw.trim())
            .map_err(|e| CanonicalHostError::InvalidUrl(e.to_string()))?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(CanonicalHostError::UnsupportedScheme(scheme.to_string()));
        }

        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(CanonicalHostError::UnexpectedComponents);
        }

        let host = url
            .host_str()
            .ok_or_else(|| CanonicalHostError::InvalidUrl("missing host".to_string()))?
            .to_ascii_lowercase();

        let port = url
            .port_or_known_default()
            .ok_or_else(|| CanonicalHostError::InvalidUrl("missing port".to_string()))?;

        let base = match url.port() {
            Some(explicit) => format!("{scheme}://{host}:{explicit}"),
            None => format!("{scheme}://{host}"),
        };

        Ok(Self { base, host, port })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Full short link for an identifier.
    pub fn short_url(&self, identifier: &str) -> String {
        format!("{}/{}", self.base, identifier)
    }

    /// Same path on the canonical host.
    pub fn redirect_target(&self, path_and_query: &str) -> String {
        if path_and_query.starts_with('/') {
            format!("{}{}", self.base, path_and_query)
        } else {
            format!("{}/{}", self.base, path_and_query)
        }
    }

    /// Returns true if a `Host` header value designates this host.
    ///
    /// Accepts the bare host name and `host:port` with the canonical port.
    pub fn matches(&self, host_header: &str) -> bool {
        let Some((host, port)) = split_host_port(host_header) else {
            return false;
        };

        host.eq_ignore_ascii_case(&self.host) && port.is_none_or(|p| p == self.port)
    }
}

/// Reads the raw `Host` header value.
pub fn extract_host_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST)?.to_str().ok()
}

/// Splits `host[:port]`, handling bracketed IPv6 literals.
///
/// Returns `None` when the port is present but not a valid number.
fn split_host_port(value: &str) -> Option<(&str, Option<u16>)> {
    let (host, rest) = if value.starts_with('[') {
        let end = value.find(']')?;
        (&value[..=end], &value[end + 1..])
    } else {
        match value.find(':') {
            Some(idx) => (&value[..idx], &value[idx..]),
            None => (value, ""),
        }
    };

    if rest.is_empty() {
        return Some((host, None));
    }

    let port = rest.strip_prefix(':')?.parse().ok()?;
    Some((host, Some(port)))
}
