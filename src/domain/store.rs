//! In-memory expiring key-value store.
//!
//! # Locking
//!
//! A single reader/writer lock guards the whole mapping. Multi-step
//! operations never hold a lock across phases:
//!
//! - reserve (read lock) and insert (write lock) are separate calls
//! - the reaper scans under a read lock, then deletes under a write lock
//!
//! Lookups never delete. An expired entry stays physically present until the
//! next reaper pass; callers treat it as absent via [`ExpiringStore::is_expired`].

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use tokio::time::Instant;

use crate::domain::entry::Entry;
use crate::domain::identifier::{
    GenerationError, Identifier, IdentifierGenerator, SecureGenerator,
};

/// Errors surfaced by [`ExpiringStore::reserve_identifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The minted identifier belongs to a live entry. Not retried here.
    #[error("store: collision detected for identifier {0}")]
    Collision(Identifier),
}

/// Mapping of identifier to [`Entry`] with a default TTL.
///
/// Constructed once at startup and shared by handle (`Arc`) with the HTTP
/// layer and the reaper.
pub struct ExpiringStore<G = SecureGenerator> {
    entries: RwLock<HashMap<Identifier, Entry>>,
    default_ttl: TimeDelta,
    generator: G,
}

impl ExpiringStore<SecureGenerator> {
    /// Creates an empty store that mints identifiers from the OS CSPRNG.
    pub fn new(default_ttl: TimeDelta) -> Self {
        Self::with_generator(default_ttl, SecureGenerator)
    }
}

impl<G: IdentifierGenerator> ExpiringStore<G> {
    pub fn with_generator(default_ttl: TimeDelta, generator: G) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            generator,
        }
    }

    pub fn default_ttl(&self) -> TimeDelta {
        self.default_ttl
    }

    /// Mints an identifier not currently present in the mapping.
    ///
    /// The membership check runs under a read lock which is released before
    /// returning; the caller is expected to [`insert`](Self::insert) right away.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Generation`] if the random source fails
    /// - [`StoreError::Collision`] if the identifier is already present; the
    ///   store is left unchanged and no retry is attempted
    pub fn reserve_identifier(&self) -> Result<Identifier, StoreError> {
        let id = self.generator.mint()?;

        if self.entries.read().contains_key(&id) {
            return Err(StoreError::Collision(id));
        }

        Ok(id)
    }

    /// Inserts `value` under `id`, stamped with the current time.
    ///
    /// Unconditional: an existing entry under `id` is replaced. Returns a copy
    /// of the stored entry.
    pub fn insert(
        &self,
        id: Identifier,
        value: impl Into<String>,
        ttl_override: Option<TimeDelta>,
    ) -> Entry {
        let entry = Entry::new(value, ttl_override);
        self.entries.write().insert(id, entry.clone());
        entry
    }

    /// Returns a copy of the entry under `id`, expired or not.
    pub fn lookup(&self, id: &str) -> Option<Entry> {
        self.entries.read().get(id).cloned()
    }

    pub fn effective_ttl(&self, entry: &Entry) -> TimeDelta {
        entry.effective_ttl(self.default_ttl)
    }

    /// Wall clock time after which `entry` counts as expired, as reported to
    /// clients.
    ///
    /// Saturates at the maximum representable time for TTLs that overflow.
    pub fn expires_at(&self, entry: &Entry) -> DateTime<Utc> {
        entry
            .inserted_at
            .checked_add_signed(self.effective_ttl(entry))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, entry: &Entry) -> bool {
        self.is_expired_at(entry, Instant::now())
    }

    /// Expired iff `inserted + effective_ttl < now` on the monotonic clock.
    ///
    /// A negative TTL counts as zero.
    pub fn is_expired_at(&self, entry: &Entry, now: Instant) -> bool {
        let ttl = self
            .effective_ttl(entry)
            .to_std()
            .unwrap_or(Duration::ZERO);
        entry.age_at(now) > ttl
    }

    /// Scan phase of a reaper cycle: identifiers expired as of now.
    pub fn collect_expired(&self) -> Vec<Identifier> {
        let now = Instant::now();
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| self.is_expired_at(entry, now))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Delete phase of a reaper cycle. Returns how many entries were removed.
    ///
    /// Identifiers already gone are skipped.
    pub fn remove_all(&self, ids: &[Identifier]) -> usize {
        let mut entries = self.entries.write();
        ids.iter()
            .filter(|id| entries.remove(id.as_str()).is_some())
            .count()
    }

    /// Runs one scan-then-delete cycle, taking the write lock only when
    /// something needs deleting.
    pub fn purge_expired(&self) -> usize {
        let expired = self.collect_expired();
        if expired.is_empty() {
            return 0;
        }
        self.remove_all(&expired)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifier::MockIdentifierGenerator;

    fn fixed_generator(id: &'static str) -> MockIdentifierGenerator {
        let mut generator = MockIdentifierGenerator::new();
        generator
            .expect_mint()
            .returning(move || Ok(Identifier::from(id)));
        generator
    }

    #[test]
    fn test_reserve_returns_well_formed_identifier() {
        let store = ExpiringStore::new(TimeDelta::minutes(60));
        for _ in 0..100 {
            let id = store.reserve_identifier().unwrap();
            assert!(id.is_well_formed());
        }
    }

    #[test]
    fn test_reserve_does_not_insert() {
        let store = ExpiringStore::new(TimeDelta::minutes(60));
        let id = store.reserve_identifier().unwrap();
        assert!(store.lookup(id.as_str()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_reserve_detects_collision() {
        let store =
            ExpiringStore::with_generator(TimeDelta::minutes(60), fixed_generator("aaaa1111"));

        let id = store.reserve_identifier().unwrap();
        store.insert(id, "https://example.com", None);

        let result = store.reserve_identifier();
        assert_eq!(
            result.unwrap_err(),
            StoreError::Collision(Identifier::from("aaaa1111"))
        );

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.lookup("aaaa1111").unwrap().value,
            "https://example.com"
        );
    }

    #[test]
    fn test_reserve_propagates_generation_error() {
        let mut generator = MockIdentifierGenerator::new();
        generator.expect_mint().times(1).returning(|| {
            Err(GenerationError::RandomSource(
                "entropy exhausted".to_string(),
            ))
        });

        let store = ExpiringStore::with_generator(TimeDelta::minutes(60), generator);

        assert!(matches!(
            store.reserve_identifier(),
            Err(StoreError::Generation(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_lookup_after_insert() {
        let store = ExpiringStore::new(TimeDelta::minutes(60));
        let id = store.reserve_identifier().unwrap();
        let inserted = store.insert(
            id.clone(),
            "https://rust-lang.org",
            Some(TimeDelta::seconds(10)),
        );

        let found = store.lookup(id.as_str()).unwrap();
        assert_eq!(found, inserted);
        assert_eq!(found.value, "https://rust-lang.org");
        assert_eq!(found.ttl_override, Some(TimeDelta::seconds(10)));
    }

    #[test]
    fn test_lookup_missing() {
        let store = ExpiringStore::new(TimeDelta::minutes(60));
        assert!(store.lookup("nope0000").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_returns_expired_entries() {
        let store = ExpiringStore::new(TimeDelta::seconds(1));
        store.insert(Identifier::from("old00000"), "https://example.com", None);

        tokio::time::advance(Duration::from_secs(3600)).await;

        let found = store.lookup("old00000").unwrap();
        assert!(store.is_expired(&found));
    }

    #[test]
    fn test_insert_instants_non_decreasing() {
        let store = ExpiringStore::new(TimeDelta::minutes(60));
        let mut previous = None;
        for i in 0..50 {
            let entry = store.insert(
                Identifier::new(format!("id{i:06}")),
                "https://example.com",
                None,
            );
            if let Some(prev) = previous {
                assert!(entry.inserted_instant >= prev);
            }
            previous = Some(entry.inserted_instant);
        }
    }

    #[test]
    fn test_expiry_boundary_default_ttl() {
        let store = ExpiringStore::new(TimeDelta::seconds(30));
        let entry = store.insert(Identifier::from("bound000"), "https://example.com", None);
        let epsilon = Duration::from_millis(1);

        let deadline = entry.inserted_instant + Duration::from_secs(30);
        assert!(!store.is_expired_at(&entry, deadline - epsilon));
        assert!(!store.is_expired_at(&entry, deadline));
        assert!(store.is_expired_at(&entry, deadline + epsilon));
    }

    #[test]
    fn test_expiry_boundary_override_ttl() {
        let store = ExpiringStore::new(TimeDelta::hours(1));
        let entry = store.insert(
            Identifier::from("bound001"),
            "https://example.com",
            Some(TimeDelta::seconds(2)),
        );
        let epsilon = Duration::from_micros(1);

        let deadline = entry.inserted_instant + Duration::from_secs(2);
        assert!(!store.is_expired_at(&entry, deadline - epsilon));
        assert!(store.is_expired_at(&entry, deadline + epsilon));
        assert_eq!(
            store.expires_at(&entry),
            entry.inserted_at + TimeDelta::seconds(2)
        );
    }

    #[test]
    fn test_expiry_ignores_wall_clock() {
        let store = ExpiringStore::new(TimeDelta::seconds(30));
        let mut entry = store.insert(Identifier::from("wall0000"), "https://example.com", None);

        // a wall clock reading far in the past must not keep the entry alive
        entry.inserted_at -= TimeDelta::hours(1);
        let later = entry.inserted_instant + Duration::from_secs(31);
        assert!(store.is_expired_at(&entry, later));

        // nor one far in the future expire it early
        entry.inserted_at += TimeDelta::hours(2);
        assert!(!store.is_expired_at(&entry, entry.inserted_instant));
    }

    #[test]
    fn test_expires_at_saturates() {
        let store = ExpiringStore::new(TimeDelta::MAX);
        let entry = Entry::new("https://example.com", None);
        assert_eq!(store.expires_at(&entry), DateTime::<Utc>::MAX_UTC);
        assert!(!store.is_expired(&entry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_removes_only_expired() {
        let store = ExpiringStore::new(TimeDelta::minutes(10));

        store.insert(Identifier::from("expired1"), "a", None);
        store.insert(Identifier::from("expired2"), "b", None);
        store.insert(Identifier::from("override"), "d", Some(TimeDelta::hours(1)));

        tokio::time::advance(Duration::from_secs(11 * 60)).await;
        store.insert(Identifier::from("livelive"), "c", None);

        let mut collected = store.collect_expired();
        collected.sort();
        assert_eq!(
            collected,
            vec![Identifier::from("expired1"), Identifier::from("expired2")]
        );

        assert_eq!(store.purge_expired(), 2);
        assert_eq!(store.len(), 2);
        assert!(store.lookup("livelive").is_some());
        assert!(store.lookup("override").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_is_idempotent() {
        let store = ExpiringStore::new(TimeDelta::minutes(10));
        store.insert(Identifier::from("expired1"), "a", None);
        tokio::time::advance(Duration::from_secs(3600)).await;
        store.insert(Identifier::from("livelive"), "b", None);

        store.purge_expired();
        let first = store.lookup("livelive");
        let len = store.len();

        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.len(), len);
        assert_eq!(store.lookup("livelive"), first);
    }

    #[test]
    fn test_remove_all_skips_missing() {
        let store = ExpiringStore::new(TimeDelta::minutes(10));
        store.insert(Identifier::from("present1"), "a", None);

        let removed = store.remove_all(&[
            Identifier::from("present1"),
            Identifier::from("missing1"),
        ]);
        assert_eq!(removed, 1);
        assert_eq!(store.remove_all(&[Identifier::from("present1")]), 0);
    }
}
