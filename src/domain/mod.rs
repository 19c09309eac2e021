//! Domain layer: the expiring link store.
//!
//! This is the core of the service and is independent of HTTP concerns.
//!
//! # Architecture
//!
//! - [`identifier`] - Short identifiers and their random generation
//! - [`entry`] - The stored record (value, insertion time, TTL override)
//! - [`store`] - Lock-guarded mapping with the uniqueness check and expiry predicate
//! - [`reaper`] - Background task physically removing expired entries
//!
//! # Entry Lifecycle
//!
//! 1. [`store::ExpiringStore::reserve_identifier`] mints an identifier absent from the map
//! 2. [`store::ExpiringStore::insert`] stores the entry (entries are never updated)
//! 3. Lookups return the entry until the reaper deletes it; callers consult
//!    [`store::ExpiringStore::is_expired`] to treat expired entries as missing
//! 4. [`reaper::Reaper`] deletes expired entries every interval

pub mod entry;
pub mod identifier;
pub mod reaper;
pub mod store;

pub use entry::Entry;
pub use identifier::{GenerationError, Identifier, IdentifierGenerator, SecureGenerator};
pub use reaper::{Reaper, ReaperStats};
pub use store::{ExpiringStore, StoreError};
