//! Cache statistics and metrics tracking
//!
//! [`CacheStats`] is the read-only report a consumer (admin screen, log line)
//! pulls from an [`EntityCache`](super::EntityCache). The counters behind it
//! are lock-free so recording never contends with the cache lock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Point-in-time statistics for one entity cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cache name (usually the entity family, e.g. `products`)
    pub name: String,

    /// Configured time-to-live
    pub ttl: Duration,

    /// Number of per-id entries currently held (valid or not yet swept)
    pub cached_ids: usize,

    /// Length of the "all entities" snapshot, if one is held
    pub snapshot_len: Option<usize>,

    /// Age of the snapshot, if one is held
    pub snapshot_age: Option<Duration>,

    /// Whether the snapshot is still within its TTL
    pub snapshot_valid: bool,

    /// Current invalidation generation
    pub generation: u64,

    /// Lookups answered from the cache
    pub hits: u64,

    /// Lookups that had to go to the store
    pub misses: u64,

    /// Values written into the cache
    pub inserts: u64,

    /// Invalidation calls (single key or whole cache)
    pub invalidations: u64,

    /// Entries dropped because their TTL elapsed
    pub expirations: u64,

    /// Loads discarded because an invalidation happened while they ran
    pub stale_puts_rejected: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total accesses)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate miss rate (misses / total accesses)
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Total number of access operations (hits + misses)
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let age = self
            .snapshot_age
            .map_or_else(|| "-".to_string(), |age| format!("{}s", age.as_secs()));
        write!(
            f,
            "{name}: ids={ids} snapshot={snap} age={age} valid={valid} hits={hits} misses={misses} hit_rate={rate:.1}%",
            name = self.name,
            ids = self.cached_ids,
            snap = self.snapshot_len.map_or_else(|| "-".to_string(), |len| len.to_string()),
            valid = self.snapshot_valid,
            hits = self.hits,
            misses = self.misses,
            rate = self.hit_rate() * 100.0,
        )
    }
}

/// Lock-free counters shared by every clone of a cache
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsCollector {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    invalidations: AtomicU64,
    expirations: AtomicU64,
    stale_puts_rejected: AtomicU64,
}

impl MetricsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.inner.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inner.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation(&self) {
        self.inner.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expirations(&self, count: u64) {
        self.inner.expirations.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_stale_put(&self) {
        self.inner.stale_puts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters into `stats`, leaving the shape fields untouched
    pub(crate) fn fill(&self, stats: &mut CacheStats) {
        stats.hits = self.inner.hits.load(Ordering::Relaxed);
        stats.misses = self.inner.misses.load(Ordering::Relaxed);
        stats.inserts = self.inner.inserts.load(Ordering::Relaxed);
        stats.invalidations = self.inner.invalidations.load(Ordering::Relaxed);
        stats.expirations = self.inner.expirations.load(Ordering::Relaxed);
        stats.stale_puts_rejected = self.inner.stale_puts_rejected.load(Ordering::Relaxed);
    }
}
