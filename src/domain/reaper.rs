//! Background removal of expired entries.
//!
//! The reaper is the only unsolicited mutator of the store and the sole owner
//! of entry destruction. Each cycle scans under a read lock, then deletes the
//! collected identifiers under a write lock (skipped when nothing expired).
//! It holds no lock while sleeping and never terminates on its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::domain::identifier::IdentifierGenerator;
use crate::domain::store::ExpiringStore;

/// Default pause between two reaper cycles.
pub const DEFAULT_REAPER_INTERVAL: Duration = Duration::from_secs(30);

/// Number of missed cycles after which the reaper is reported as stalled.
const STALL_FACTOR: u32 = 3;

/// Counters shared between the reaper task and the health endpoint.
#[derive(Debug)]
pub struct ReaperStats {
    started_at: DateTime<Utc>,
    interval: Duration,
    cycles: AtomicU64,
    reaped: AtomicU64,
    /// Milliseconds since the epoch, `i64::MIN` until the first cycle.
    last_cycle_ms: AtomicI64,
}

impl ReaperStats {
    pub fn new(interval: Duration) -> Self {
        Self {
            started_at: Utc::now(),
            interval,
            cycles: AtomicU64::new(0),
            reaped: AtomicU64::new(0),
            last_cycle_ms: AtomicI64::new(i64::MIN),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Total entries removed since startup.
    pub fn reaped(&self) -> u64 {
        self.reaped.load(Ordering::Relaxed)
    }

    pub fn last_cycle_at(&self) -> Option<DateTime<Utc>> {
        match self.last_cycle_ms.load(Ordering::Relaxed) {
            i64::MIN => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    /// True when no cycle completed for more than three intervals.
    pub fn is_stalled_at(&self, now: DateTime<Utc>) -> bool {
        let last = self.last_cycle_at().unwrap_or(self.started_at);
        let budget = TimeDelta::from_std(self.interval * STALL_FACTOR).unwrap_or(TimeDelta::MAX);
        now - last > budget
    }

    fn record_cycle(&self, removed: usize, at: DateTime<Utc>) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.reaped.fetch_add(removed as u64, Ordering::Relaxed);
        self.last_cycle_ms
            .store(at.timestamp_millis(), Ordering::Relaxed);
    }
}

/// Perpetual task purging expired entries at a fixed cadence.
pub struct Reaper<G> {
    store: Arc<ExpiringStore<G>>,
    interval: Duration,
    stats: Arc<ReaperStats>,
}

impl<G> Reaper<G>
where
    G: IdentifierGenerator + 'static,
{
    /// Creates a reaper over `store`.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new(store: Arc<ExpiringStore<G>>, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "reaper interval must be non-zero");
        Self {
            store,
            interval,
            stats: Arc::new(ReaperStats::new(interval)),
        }
    }

    pub fn stats(&self) -> Arc<ReaperStats> {
        self.stats.clone()
    }

    /// Runs a single scan-then-delete cycle and records it.
    pub fn run_once(&self) -> usize {
        let removed = self.store.purge_expired();
        self.stats.record_cycle(removed, Utc::now());
        removed
    }

    /// Sleeps one interval, runs a cycle, forever.
    pub async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?self.interval, "Expired entry reaper started");

        loop {
            ticker.tick().await;
            let removed = self.run_once();
            if removed > 0 {
                debug!(removed, remaining = self.store.len(), "Reaped expired entries");
            }
        }
    }

    /// Spawns the reaper on the tokio runtime. Nothing is reported back.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifier::Identifier;

    /// Store holding `n` entries already five minutes past a one-minute TTL.
    async fn store_with_expired(n: usize) -> Arc<ExpiringStore> {
        let store = Arc::new(ExpiringStore::new(TimeDelta::minutes(1)));
        for i in 0..n {
            store.insert(
                Identifier::new(format!("stale{i:03}")),
                "https://example.com",
                None,
            );
        }
        tokio::time::advance(Duration::from_secs(6 * 60)).await;
        store
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_once_records_stats() {
        let store = store_with_expired(3).await;
        store.insert(Identifier::from("livelive"), "https://example.com", None);

        let reaper = Reaper::new(store.clone(), Duration::from_secs(30));
        let stats = reaper.stats();

        assert_eq!(reaper.run_once(), 3);
        assert_eq!(reaper.run_once(), 0);

        assert_eq!(stats.cycles(), 2);
        assert_eq!(stats.reaped(), 3);
        assert!(stats.last_cycle_at().is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_zero_interval_rejected() {
        let store = Arc::new(ExpiringStore::new(TimeDelta::minutes(1)));
        let _ = Reaper::new(store, Duration::ZERO);
    }

    #[test]
    fn test_stats_stall_detection() {
        let stats = ReaperStats::new(Duration::from_secs(30));
        let now = Utc::now();

        assert!(!stats.is_stalled_at(now));
        assert!(!stats.is_stalled_at(now + TimeDelta::seconds(89)));
        assert!(stats.is_stalled_at(now + TimeDelta::seconds(91)));

        stats.record_cycle(0, now + TimeDelta::seconds(60));
        assert!(!stats.is_stalled_at(now + TimeDelta::seconds(91)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_reaper_purges() {
        let store = store_with_expired(5).await;
        let reaper = Reaper::new(store.clone(), Duration::from_millis(20));
        let stats = reaper.stats();
        let handle = reaper.spawn();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.is_empty());
        assert!(stats.cycles() >= 1);
        assert_eq!(stats.reaped(), 5);
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_waits_one_interval() {
        let store = store_with_expired(2).await;
        let reaper = Reaper::new(store.clone(), Duration::from_secs(30));
        let stats = reaper.stats();
        let handle = reaper.spawn();

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(stats.cycles(), 0);
        assert_eq!(store.len(), 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(stats.cycles(), 1);
        assert!(store.is_empty());
        handle.abort();
    }
}
