//! TTL entity cache with a per-id map and a whole-collection snapshot
//!
//! Both views live behind one reader/writer lock, so `invalidate_all` is a
//! single atomic step: no reader can observe the snapshot cleared while
//! per-id entries survive, or the reverse.
//!
//! Every invalidation bumps a generation counter. Loaders that read the
//! store outside the lock capture [`EntityCache::generation`] first and
//! publish through the `*_if_current` methods, which drop the load if an
//! invalidation happened in between.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use super::config::CacheConfig;
use super::sink::{CacheMetricsSink, NoopMetricsSink};
use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

/// Invalidation epoch of an [`EntityCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Raw counter value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A cached value and the instant it was loaded
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    loaded_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_valid(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.loaded_at) < ttl
    }
}

#[derive(Debug)]
struct CacheState<K, V> {
    by_id: HashMap<K, CacheEntry<V>>,
    snapshot: Option<CacheEntry<Vec<V>>>,
    generation: u64,
}

impl<K, V> CacheState<K, V> {
    fn new() -> Self {
        Self { by_id: HashMap::new(), snapshot: None, generation: 0 }
    }
}

/// Thread-safe TTL cache for one entity family
///
/// # Type Parameters
/// - `K`: entity id type
/// - `V`: entity type; values are cloned out so callers never share the
///   cached copy
/// - `C`: clock used for TTL checks (defaults to [`SystemClock`])
///
/// Cloning an `EntityCache` yields another handle to the same storage.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use storefront_common::cache::{CacheConfig, EntityCache};
///
/// let cache: EntityCache<i64, String> =
///     EntityCache::new("products", CacheConfig::ttl(Duration::from_secs(300)));
/// cache.put(1, "Desk lamp".to_string());
/// assert_eq!(cache.get(&1), Some("Desk lamp".to_string()));
///
/// cache.invalidate_all();
/// assert_eq!(cache.get(&1), None);
/// ```
pub struct EntityCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    name: Arc<str>,
    state: Arc<RwLock<CacheState<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    sink: Arc<dyn CacheMetricsSink>,
    clock: C,
}

impl<K, V> EntityCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache named `name` using the system clock
    pub fn new(name: impl Into<Arc<str>>, config: CacheConfig) -> Self {
        Self::with_clock(name, config, SystemClock)
    }
}

impl<K, V, C> EntityCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Create a cache with a custom clock (useful for testing)
    pub fn with_clock(name: impl Into<Arc<str>>, config: CacheConfig, clock: C) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(CacheState::new())),
            config,
            metrics: MetricsCollector::new(),
            sink: Arc::new(NoopMetricsSink),
            clock,
        }
    }

    /// Report lookups to `sink` as well as the built-in counters
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn CacheMetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Name the cache reports under in stats and metrics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lifetime of every entry and of the snapshot
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Current invalidation generation
    pub fn generation(&self) -> Generation {
        Generation(self.state.read().generation)
    }

    /// Get a value by id if present and younger than the TTL
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let ttl = self.config.ttl;

        let outcome = {
            let state = self.state.read();
            state.by_id.get(key).map(|entry| {
                if entry.is_valid(now, ttl) {
                    Some(entry.value.clone())
                } else {
                    None
                }
            })
        };

        match outcome {
            Some(Some(value)) => {
                self.record_hit();
                Some(value)
            }
            Some(None) => {
                let removed = {
                    let mut state = self.state.write();
                    let expired =
                        state.by_id.get(key).is_some_and(|entry| !entry.is_valid(now, ttl));
                    if expired {
                        state.by_id.remove(key);
                    }
                    expired
                };
                if removed && self.config.track_metrics {
                    self.metrics.record_expirations(1);
                }
                self.record_miss();
                None
            }
            None => {
                self.record_miss();
                None
            }
        }
    }

    /// Get an owned copy of the whole collection if the snapshot is valid
    pub fn get_snapshot(&self) -> Option<Vec<V>> {
        let now = self.clock.now();
        let snapshot = {
            let state = self.state.read();
            state
                .snapshot
                .as_ref()
                .filter(|entry| entry.is_valid(now, self.config.ttl))
                .map(|entry| entry.value.clone())
        };

        if snapshot.is_some() {
            self.record_hit();
        } else {
            self.record_miss();
        }
        snapshot
    }

    /// Store a single value stamped with the current time
    pub fn put(&self, key: K, value: V) {
        let loaded_at = self.clock.now();
        self.state.write().by_id.insert(key, CacheEntry { value, loaded_at });
        self.record_insert();
    }

    /// Store a single value unless an invalidation happened after `seen`
    ///
    /// Returns `false` when the value was discarded.
    pub fn put_if_current(&self, seen: Generation, key: K, value: V) -> bool {
        let loaded_at = self.clock.now();
        let accepted = {
            let mut state = self.state.write();
            if state.generation == seen.0 {
                state.by_id.insert(key, CacheEntry { value, loaded_at });
                true
            } else {
                false
            }
        };
        self.after_conditional_put(accepted);
        accepted
    }

    /// Store the whole-collection snapshot stamped with the current time
    pub fn put_snapshot(&self, items: Vec<V>) {
        let loaded_at = self.clock.now();
        self.state.write().snapshot = Some(CacheEntry { value: items, loaded_at });
        self.record_insert();
    }

    /// Store the snapshot and a per-id entry for every item in one step
    pub fn put_all<F>(&self, items: Vec<V>, key_of: F)
    where
        F: Fn(&V) -> K,
    {
        let loaded_at = self.clock.now();
        let mut state = self.state.write();
        Self::install_all(&mut state, items, &key_of, loaded_at);
        drop(state);
        self.record_insert();
    }

    /// Same as [`put_all`](Self::put_all), guarded by the generation seen
    /// before the load started
    pub fn put_all_if_current<F>(&self, seen: Generation, items: Vec<V>, key_of: F) -> bool
    where
        F: Fn(&V) -> K,
    {
        let loaded_at = self.clock.now();
        let accepted = {
            let mut state = self.state.write();
            if state.generation == seen.0 {
                Self::install_all(&mut state, items, &key_of, loaded_at);
                true
            } else {
                false
            }
        };
        self.after_conditional_put(accepted);
        accepted
    }

    fn install_all<F>(state: &mut CacheState<K, V>, items: Vec<V>, key_of: &F, loaded_at: Instant)
    where
        F: Fn(&V) -> K,
    {
        for item in &items {
            state.by_id.insert(key_of(item), CacheEntry { value: item.clone(), loaded_at });
        }
        state.snapshot = Some(CacheEntry { value: items, loaded_at });
    }

    /// Remove one entry
    ///
    /// The snapshot is left alone; callers that changed the collection use
    /// [`invalidate_all`](Self::invalidate_all).
    pub fn invalidate(&self, key: &K) {
        {
            let mut state = self.state.write();
            state.by_id.remove(key);
            state.generation = state.generation.wrapping_add(1);
        }
        if self.config.track_metrics {
            self.metrics.record_invalidation();
        }
    }

    /// Clear every per-id entry and the snapshot atomically
    pub fn invalidate_all(&self) {
        let (dropped, generation) = {
            let mut state = self.state.write();
            let dropped = state.by_id.len();
            state.by_id.clear();
            state.snapshot = None;
            state.generation = state.generation.wrapping_add(1);
            (dropped, state.generation)
        };

        if self.config.track_metrics {
            self.metrics.record_invalidation();
        }
        debug!(cache = %self.name, dropped, generation, "cache invalidated");
    }

    /// Drop expired entries and an expired snapshot
    ///
    /// Returns the number of per-id entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.ttl;

        let (removed, snapshot_removed) = {
            let mut state = self.state.write();
            let before = state.by_id.len();
            state.by_id.retain(|_, entry| entry.is_valid(now, ttl));
            let removed = before - state.by_id.len();

            let snapshot_removed =
                state.snapshot.as_ref().is_some_and(|entry| !entry.is_valid(now, ttl));
            if snapshot_removed {
                state.snapshot = None;
            }
            (removed, snapshot_removed)
        };

        if self.config.track_metrics {
            self.metrics.record_expirations((removed + usize::from(snapshot_removed)) as u64);
        }
        removed
    }

    /// Number of per-id entries held, including not yet swept expired ones
    pub fn len(&self) -> usize {
        self.state.read().by_id.len()
    }

    /// True when neither a snapshot nor any per-id entry is held
    pub fn is_empty(&self) -> bool {
        let state = self.state.read();
        state.by_id.is_empty() && state.snapshot.is_none()
    }

    /// Whether a snapshot is held and still within its TTL
    pub fn has_valid_snapshot(&self) -> bool {
        let now = self.clock.now();
        self.state.read().snapshot.as_ref().is_some_and(|entry| entry.is_valid(now, self.config.ttl))
    }

    /// Age of the snapshot, if one is held
    pub fn snapshot_age(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.state
            .read()
            .snapshot
            .as_ref()
            .map(|entry| now.saturating_duration_since(entry.loaded_at))
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let mut stats = {
            let state = self.state.read();
            CacheStats {
                name: self.name.to_string(),
                ttl,
                cached_ids: state.by_id.len(),
                snapshot_len: state.snapshot.as_ref().map(|entry| entry.value.len()),
                snapshot_age: state
                    .snapshot
                    .as_ref()
                    .map(|entry| now.saturating_duration_since(entry.loaded_at)),
                snapshot_valid: state.snapshot.as_ref().is_some_and(|entry| entry.is_valid(now, ttl)),
                generation: state.generation,
                ..CacheStats::default()
            }
        };
        self.metrics.fill(&mut stats);
        stats
    }

    fn after_conditional_put(&self, accepted: bool) {
        if accepted {
            self.record_insert();
        } else {
            if self.config.track_metrics {
                self.metrics.record_stale_put();
            }
            debug!(cache = %self.name, "discarded load that raced an invalidation");
        }
    }

    fn record_hit(&self) {
        if self.config.track_metrics {
            self.metrics.record_hit();
        }
        self.sink.record_hit(&self.name);
    }

    fn record_miss(&self) {
        if self.config.track_metrics {
            self.metrics.record_miss();
        }
        self.sink.record_miss(&self.name);
    }

    fn record_insert(&self) {
        if self.config.track_metrics {
            self.metrics.record_insert();
        }
    }
}

impl<K, V, C> Clone for EntityCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            state: Arc::clone(&self.state),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            sink: Arc::clone(&self.sink),
            clock: self.clock.clone(),
        }
    }
}

impl<K, V, C> std::fmt::Debug for EntityCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("name", &self.name)
            .field("ttl", &self.config.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::core.
    use std::thread;

    use super::*;
    use crate::cache::RecordingMetricsSink;
    use crate::time::MockClock;

    fn mock_cache(ttl_secs: u64) -> (EntityCache<i64, String, MockClock>, MockClock) {
        let clock = MockClock::new();
        let cache =
            EntityCache::with_clock("test", CacheConfig::ttl_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    /// Validates `EntityCache::put` and `EntityCache::get` for the basic hit
    /// and miss scenario.
    ///
    /// Assertions:
    /// - Confirms `cache.get(&1)` equals `Some("one")`.
    /// - Confirms `cache.get(&2)` equals `None`.
    #[test]
    fn test_put_and_get() {
        let (cache, _clock) = mock_cache(10);
        cache.put(1, "one".to_string());

        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.len(), 1);
    }

    /// Validates that a value is served strictly before the TTL elapses and
    /// missed from the instant it does.
    ///
    /// Assertions:
    /// - Confirms a hit at `ttl - 1ms`.
    /// - Confirms a miss at exactly `ttl`.
    /// - Confirms the expired entry is removed.
    #[test]
    fn test_ttl_boundary() {
        let (cache, clock) = mock_cache(10);
        cache.put(1, "one".to_string());

        clock.advance(Duration::from_millis(9_999));
        assert_eq!(cache.get(&1), Some("one".to_string()));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_snapshot_expires_with_ttl() {
        let (cache, clock) = mock_cache(5);
        cache.put_snapshot(vec!["a".to_string(), "b".to_string()]);

        assert_eq!(cache.get_snapshot().map(|items| items.len()), Some(2));
        assert!(cache.has_valid_snapshot());

        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.get_snapshot(), None);
        assert!(!cache.has_valid_snapshot());
        assert_eq!(cache.snapshot_age(), Some(Duration::from_secs(5)));
    }

    /// Validates that `put_all` populates both views and `invalidate_all`
    /// clears both.
    ///
    /// Assertions:
    /// - Confirms every per-id lookup hits after `put_all`.
    /// - Confirms snapshot and every per-id lookup miss after
    ///   `invalidate_all`.
    #[test]
    fn test_put_all_then_invalidate_all() {
        let (cache, _clock) = mock_cache(60);
        let items: Vec<String> = vec!["1:lamp".into(), "2:desk".into(), "3:chair".into()];
        cache.put_all(items, |item| item[..1].parse::<i64>().unwrap_or_default());

        assert_eq!(cache.get(&2), Some("2:desk".to_string()));
        assert_eq!(cache.get_snapshot().map(|items| items.len()), Some(3));

        cache.invalidate_all();

        assert_eq!(cache.get_snapshot(), None);
        for key in 1..=3 {
            assert_eq!(cache.get(&key), None);
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_single_key_keeps_others() {
        let (cache, _clock) = mock_cache(60);
        cache.put(1, "one".to_string());
        cache.put(2, "two".to_string());

        cache.invalidate(&1);

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("two".to_string()));
    }

    /// Validates that a load started before an invalidation cannot publish
    /// its result afterwards.
    ///
    /// Assertions:
    /// - Ensures `put_all_if_current` with a stale generation returns false.
    /// - Confirms the snapshot stays empty.
    /// - Confirms `stats.stale_puts_rejected` equals `1`.
    #[test]
    fn test_stale_load_is_rejected_after_invalidation() {
        let (cache, _clock) = mock_cache(60);
        let seen = cache.generation();

        // A writer commits while the load is in flight.
        cache.invalidate_all();

        let accepted = cache.put_all_if_current(seen, vec!["old".to_string()], |_| 1);
        assert!(!accepted);
        assert_eq!(cache.get_snapshot(), None);
        assert!(!cache.put_if_current(seen, 1, "old".to_string()));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.stats().stale_puts_rejected, 2);

        let fresh = cache.generation();
        assert!(fresh > seen);
        assert!(cache.put_if_current(fresh, 1, "new".to_string()));
        assert_eq!(cache.get(&1), Some("new".to_string()));
    }

    #[test]
    fn test_cleanup_expired_sweeps_entries_and_snapshot() {
        let (cache, clock) = mock_cache(10);
        cache.put(1, "one".to_string());
        cache.put(2, "two".to_string());
        cache.put_snapshot(vec!["one".to_string(), "two".to_string()]);

        clock.advance(Duration::from_secs(6));
        cache.put(3, "three".to_string());
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.cleanup_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.snapshot_age(), None);
        assert_eq!(cache.stats().expirations, 3);
    }

    /// Validates `EntityCache::stats` bookkeeping and sink forwarding.
    ///
    /// Assertions:
    /// - Confirms `stats.hits` equals `2` and `stats.misses` equals `2`.
    /// - Confirms the sink observed the same numbers under the cache name.
    #[test]
    fn test_stats_and_sink() {
        let sink = Arc::new(RecordingMetricsSink::new());
        let clock = MockClock::new();
        let cache: EntityCache<i64, String, MockClock> =
            EntityCache::with_clock("orders", CacheConfig::ttl_secs(60), clock)
                .with_sink(sink.clone());

        cache.put(1, "one".to_string());
        let _ = cache.get(&1);
        let _ = cache.get(&2);
        let _ = cache.get_snapshot();
        cache.put_snapshot(vec!["one".to_string()]);
        let _ = cache.get_snapshot();

        let stats = cache.stats();
        assert_eq!(stats.name, "orders");
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.snapshot_len, Some(1));
        assert!(stats.snapshot_valid);
        assert_eq!(sink.hits("orders"), 2);
        assert_eq!(sink.misses("orders"), 2);
    }

    #[test]
    fn test_clone_shares_storage() {
        let (cache, _clock) = mock_cache(60);
        let other = cache.clone();
        other.put(7, "seven".to_string());

        assert_eq!(cache.get(&7), Some("seven".to_string()));
        cache.invalidate_all();
        assert_eq!(other.get(&7), None);
        assert_eq!(other.generation(), cache.generation());
    }

    /// Validates that readers never observe a half-cleared cache while a
    /// writer repeatedly repopulates and invalidates.
    ///
    /// Assertions:
    /// - Ensures every observed snapshot has its matching per-id entry or
    ///   the lookup misses after a concurrent invalidation.
    #[test]
    fn test_concurrent_invalidate_and_read() {
        let cache: EntityCache<i64, i64> = EntityCache::new("numbers", CacheConfig::ttl_secs(60));
        let writer = {
            let cache = cache.clone();
            thread::spawn(move || {
                for round in 0..200 {
                    cache.put_all(vec![round, round + 1], |value| *value);
                    cache.invalidate_all();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        if let Some(snapshot) = cache.get_snapshot() {
                            assert_eq!(snapshot.len(), 2);
                            assert_eq!(snapshot[1], snapshot[0] + 1);
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert!(cache.is_empty());
    }
}
