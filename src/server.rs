//! HTTP server initialization and runtime setup.
//!
//! Builds the store, spawns the reaper and runs the Axum server, over
//! HTTPS when a certificate is configured, plus the optional plain HTTP
//! redirect listener.

use crate::application::services::AuthService;
use crate::config::Config;
use crate::domain::{ExpiringStore, Reaper};
use crate::routes::{app_router, redirect_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Time given to in-flight requests once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The in-memory expiring store
/// - The background reaper
/// - Axum HTTP(S) server, stopped by Ctrl-C
/// - The HTTP to canonical host redirector, when `HTTP_REDIRECT_LISTEN` is set
///
/// The store lives until this function returns; nothing is persisted.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - The certificate or key cannot be loaded
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let canonical_host = config.canonical_host()?;

    let store = Arc::new(ExpiringStore::new(config.url_ttl));

    let reaper = Reaper::new(store.clone(), config.reaper_interval());
    let reaper_stats = reaper.stats();
    reaper.spawn();
    tracing::info!("Reaper started");

    let state = AppState::new(
        store,
        AuthService::new(config.token_sha256.clone()),
        reaper_stats,
        canonical_host.clone(),
        config.enforce_canonical_host,
    );

    let app = app_router(state);
    let addr = parse_addr("LISTEN", &config.listen_addr)?;

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    if let Some(redirect_addr) = &config.http_redirect_listen {
        let redirect_addr = parse_addr("HTTP_REDIRECT_LISTEN", redirect_addr)?;
        let redirect_app = redirect_router(canonical_host);
        let handle = handle.clone();
        tokio::spawn(async move {
            tracing::info!("Redirecting http://{redirect_addr} to the canonical host");
            if let Err(e) = serve_plain(redirect_addr, redirect_app, handle).await {
                tracing::error!("HTTP redirect listener failed: {:#}", e);
            }
        });
    }

    match config.tls_files() {
        Some((cert, key)) => {
            // reqwest links rustls with ring too; pick it explicitly
            let _ = rustls::crypto::ring::default_provider().install_default();

            let tls = RustlsConfig::from_pem_file(cert, key)
                .await
                .with_context(|| format!("Failed to load TLS certificate {cert} / key {key}"))?;
            tracing::info!("Listening on https://{addr}");
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .with_context(|| format!("HTTPS server on {addr} failed"))?;
        }
        None => {
            tracing::info!("Listening on http://{addr}");
            serve_plain(addr, app, handle).await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn serve_plain(addr: SocketAddr, app: Router, handle: Handle) -> Result<()> {
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .with_context(|| format!("HTTP server on {addr} failed"))
}

fn parse_addr(key: &str, raw: &str) -> Result<SocketAddr> {
    raw.parse()
        .with_context(|| format!("Invalid {key} address '{raw}'"))
}

async fn shutdown_on_signal(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
