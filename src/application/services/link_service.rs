//! Short link creation and resolution.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::{ExpiringStore, Identifier, IdentifierGenerator, SecureGenerator, StoreError};
use crate::error::AppError;
use crate::utils::canonical_host::CanonicalHost;

/// Upper bound on identifier reservations per creation request.
///
/// Only collisions are retried; a failing random source fails immediately.
pub const MAX_RESERVE_ATTEMPTS: usize = 3;

/// Result of a successful creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedLink {
    pub identifier: Identifier,
    pub short_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Service creating and resolving short links on top of [`ExpiringStore`].
pub struct LinkService<G = SecureGenerator> {
    store: Arc<ExpiringStore<G>>,
    canonical_host: CanonicalHost,
}

impl<G: IdentifierGenerator> LinkService<G> {
    pub fn new(store: Arc<ExpiringStore<G>>, canonical_host: CanonicalHost) -> Self {
        Self {
            store,
            canonical_host,
        }
    }

    pub fn store(&self) -> &Arc<ExpiringStore<G>> {
        &self.store
    }

    /// Stores `long_url` under a fresh identifier.
    ///
    /// A zero `ttl` means the store default applies.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is empty or the TTL is negative.
    ///
    /// Returns [`AppError::Internal`] if the random source fails or every
    /// reservation attempt collided.
    pub fn create_short_link(
        &self,
        long_url: String,
        ttl: Option<TimeDelta>,
    ) -> Result<CreatedLink, AppError> {
        if long_url.is_empty() {
            return Err(AppError::bad_request("url is required"));
        }

        let ttl_override = match ttl {
            Some(ttl) if ttl < TimeDelta::zero() => {
                return Err(AppError::bad_request("ttl must not be negative"));
            }
            Some(ttl) if ttl.is_zero() => None,
            other => other,
        };

        let identifier = self.reserve_identifier()?;
        let entry = self.store.insert(identifier.clone(), long_url, ttl_override);
        let expires_at = self.store.expires_at(&entry);

        info!(identifier = %identifier, %expires_at, "Created short link");

        Ok(CreatedLink {
            short_url: self.canonical_host.short_url(identifier.as_str()),
            identifier,
            expires_at,
        })
    }

    /// Returns the stored URL for a live identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identifier is unknown or expired.
    pub fn resolve(&self, identifier: &str) -> Result<String, AppError> {
        let entry = self.store.lookup(identifier).ok_or_else(AppError::not_found)?;

        if self.store.is_expired(&entry) {
            // left in place for the reaper
            debug!(identifier, "Lookup of expired link");
            return Err(AppError::not_found());
        }

        Ok(entry.value)
    }

    fn reserve_identifier(&self) -> Result<Identifier, AppError> {
        for attempt in 1..=MAX_RESERVE_ATTEMPTS {
            match self.store.reserve_identifier() {
                Ok(identifier) => return Ok(identifier),
                Err(StoreError::Collision(identifier)) => {
                    warn!(attempt, identifier = %identifier, "Identifier collision");
                }
                Err(e @ StoreError::Generation(_)) => {
                    error!(error = %e, "Identifier generation failed");
                    return Err(e.into());
                }
            }
        }

        Err(AppError::internal(format!(
            "Failed to reserve a unique identifier after {MAX_RESERVE_ATTEMPTS} attempts"
        )))
    }
}
