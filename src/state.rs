//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService};
use crate::domain::{ExpiringStore, ReaperStats};
use crate::utils::canonical_host::CanonicalHost;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
    pub reaper_stats: Arc<ReaperStats>,
    pub canonical_host: CanonicalHost,
    /// When false, requests are served regardless of their `Host` header.
    pub enforce_canonical_host: bool,
}

impl AppState {
    pub fn new(
        store: Arc<ExpiringStore>,
        auth_service: AuthService,
        reaper_stats: Arc<ReaperStats>,
        canonical_host: CanonicalHost,
        enforce_canonical_host: bool,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(store, canonical_host.clone())),
            auth_service: Arc::new(auth_service),
            reaper_stats,
            canonical_host,
            enforce_canonical_host,
        }
    }

    pub fn store(&self) -> &Arc<ExpiringStore> {
        self.link_service.store()
    }
}
