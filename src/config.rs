//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Canonical Host
//!
//! ### Method 1: Full URL
//!
//! ```bash
//! export CANONICAL_HOST="https://s.example.com"
//! ```
//!
//! ### Method 2: Individual components
//!
//! ```bash
//! export PUBLIC_HOST="s.example.com"
//! export PUBLIC_PORT="8443"
//! ```
//!
//! If `CANONICAL_HOST` is not set, it is built as `https://PUBLIC_HOST[:PUBLIC_PORT]`,
//! omitting the port when it is 443.
//!
//! ## Required Variables
//!
//! - `TOKEN_SHA256` - hex SHA-256 of the secret token (`admin token hash <token>`)
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `ENFORCE_CANONICAL_HOST` - Redirect other hosts (default: `true`)
//! - `URL_TTL` - Default link lifetime, e.g. `60m`, `12h` (default: `60m`)
//! - `REAPER_INTERVAL_SECONDS` - Expired entry sweep cadence (default: 30)
//! - `TLS_CERT_FILE` / `TLS_KEY_FILE` - PEM certificate chain and key; when
//!   both are set the main listener serves HTTPS
//! - `HTTP_REDIRECT_LISTEN` - Extra plain HTTP listener redirecting every
//!   request to the canonical host (e.g. `0.0.0.0:80`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use chrono::TimeDelta;
use std::env;
use std::time::Duration;

use crate::utils::canonical_host::CanonicalHost;
use crate::utils::duration::parse_duration;

const DEFAULT_URL_TTL: &str = "60m";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Externally advertised base URL, e.g. `https://s.example.com`.
    pub canonical_host: String,
    /// When true, requests for any other host are redirected to `canonical_host`.
    pub enforce_canonical_host: bool,
    /// Lowercase hex SHA-256 digest of the secret token.
    pub token_sha256: String,
    /// Lifetime of links created without an explicit TTL.
    pub url_ttl: TimeDelta,
    /// Pause between two reaper cycles, in seconds.
    pub reaper_interval_seconds: u64,
    pub tls_cert_file: Option<String>,
    pub tls_key_file: Option<String>,
    /// Bind address of the HTTP to canonical host redirector, if any.
    pub http_redirect_listen: Option<String>,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `TOKEN_SHA256` is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let canonical_host = Self::load_canonical_host();

        let enforce_canonical_host = env::var("ENFORCE_CANONICAL_HOST")
            .map(|v| !(v.eq_ignore_ascii_case("false") || v == "0"))
            .unwrap_or(true);

        let token_sha256 = env::var("TOKEN_SHA256")
            .context("TOKEN_SHA256 must be set (see `admin token hash`)")?
            .trim()
            .to_ascii_lowercase();

        let raw_ttl = env::var("URL_TTL").unwrap_or_else(|_| DEFAULT_URL_TTL.to_string());
        let url_ttl = parse_duration(&raw_ttl)
            .with_context(|| format!("URL_TTL is not a valid duration: '{raw_ttl}'"))?;

        let reaper_interval_seconds = match env::var("REAPER_INTERVAL_SECONDS") {
            Ok(raw) => raw.trim().parse().with_context(|| {
                format!("REAPER_INTERVAL_SECONDS must be a whole number of seconds, got '{raw}'")
            })?,
            Err(_) => 30,
        };

        let tls_cert_file = non_empty_var("TLS_CERT_FILE");
        let tls_key_file = non_empty_var("TLS_KEY_FILE");
        let http_redirect_listen = non_empty_var("HTTP_REDIRECT_LISTEN");

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            listen_addr,
            canonical_host,
            enforce_canonical_host,
            token_sha256,
            url_ttl,
            reaper_interval_seconds,
            tls_cert_file,
            tls_key_file,
            http_redirect_listen,
            log_level,
            log_format,
        })
    }

    /// Loads the canonical host with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `CANONICAL_HOST` environment variable
    /// 2. Constructed from `PUBLIC_HOST` and `PUBLIC_PORT`
    fn load_canonical_host() -> String {
        if let Ok(url) = env::var("CANONICAL_HOST") {
            return url;
        }

        let host = env::var("PUBLIC_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("PUBLIC_PORT").unwrap_or_else(|_| "443".to_string());

        if port == "443" {
            format!("https://{}", host)
        } else {
            format!("https://{}:{}", host, port)
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `token_sha256` is not 64 hex characters
    /// - `canonical_host` is not a bare http(s) URL
    /// - `url_ttl` is not positive
    /// - `reaper_interval_seconds` is outside 1..=86400
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` or `http_redirect_listen` is invalid
    /// - only one of `tls_cert_file` and `tls_key_file` is set
    pub fn validate(&self) -> Result<()> {
        if self.token_sha256.len() != 64
            || !self.token_sha256.chars().all(|c| c.is_ascii_hexdigit())
        {
            anyhow::bail!("TOKEN_SHA256 must be a hex-encoded SHA-256 digest (64 characters)");
        }

        self.canonical_host()?;

        if self.url_ttl <= TimeDelta::zero() {
            anyhow::bail!("URL_TTL must be greater than 0");
        }

        if self.reaper_interval_seconds == 0 || self.reaper_interval_seconds > 86_400 {
            anyhow::bail!(
                "REAPER_INTERVAL_SECONDS must be between 1 and 86400, got {}",
                self.reaper_interval_seconds
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if let Some(addr) = &self.http_redirect_listen
            && !addr.contains(':')
        {
            anyhow::bail!("HTTP_REDIRECT_LISTEN must be in format 'host:port', got '{addr}'");
        }

        if self.tls_cert_file.is_some() != self.tls_key_file.is_some() {
            anyhow::bail!("TLS_CERT_FILE and TLS_KEY_FILE must be set together");
        }

        Ok(())
    }

    /// Parsed form of [`Config::canonical_host`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a bare http(s) base URL.
    pub fn canonical_host(&self) -> Result<CanonicalHost> {
        CanonicalHost::parse(&self.canonical_host)
            .with_context(|| format!("CANONICAL_HOST is invalid: '{}'", self.canonical_host))
    }

    /// Certificate and key paths when HTTPS is configured.
    pub fn tls_files(&self) -> Option<(&str, &str)> {
        self.tls_cert_file
            .as_deref()
            .zip(self.tls_key_file.as_deref())
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_seconds)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Canonical host: {}", self.canonical_host);
        tracing::info!("  Enforce canonical host: {}", self.enforce_canonical_host);
        tracing::info!("  Token digest: {}", mask_digest(&self.token_sha256));
        tracing::info!("  URL TTL: {}s", self.url_ttl.num_seconds());
        tracing::info!("  Reaper interval: {}s", self.reaper_interval_seconds);
        let tls = if self.tls_files().is_some() {
            "enabled"
        } else {
            "disabled"
        };
        tracing::info!("  TLS: {}", tls);
        if let Some(addr) = &self.http_redirect_listen {
            tracing::info!("  HTTP redirect listener: {}", addr);
        }
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keeps the first 8 characters of a digest for log correlation.
fn mask_digest(digest: &str) -> String {
    match digest.get(..8) {
        Some(prefix) if digest.len() > 8 => format!("{prefix}***"),
        _ => "***".to_string(),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
