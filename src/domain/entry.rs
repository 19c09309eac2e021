//! Stored record for a single short link.

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// A value held by the store together with its expiry inputs.
///
/// Entries are immutable once inserted. `ttl_override`, when present,
/// replaces the store's default TTL for this entry only.
///
/// Expiry is decided on `inserted_instant`, a monotonic reading, so clock
/// steps neither extend nor shorten a link's life. `inserted_at` is the wall
/// clock time used to report `expires` to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    pub inserted_at: DateTime<Utc>,
    pub inserted_instant: Instant,
    pub ttl_override: Option<TimeDelta>,
}

impl Entry {
    /// Creates an entry stamped with the current time.
    pub fn new(value: impl Into<String>, ttl_override: Option<TimeDelta>) -> Self {
        Self {
            value: value.into(),
            inserted_at: Utc::now(),
            inserted_instant: Instant::now(),
            ttl_override,
        }
    }

    /// TTL governing this entry given the store default.
    pub fn effective_ttl(&self, default_ttl: TimeDelta) -> TimeDelta {
        self.ttl_override.unwrap_or(default_ttl)
    }

    /// Time elapsed since insertion as of `now`, zero if `now` is earlier.
    pub fn age_at(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.inserted_instant)
    }
}
