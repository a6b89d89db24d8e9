//! Read-through entity service.
//!
//! # Caching Strategy
//!
//! - **Read-through**: check the cache first, query the store on a miss,
//!   populate the cache with what was read
//! - **Invalidate on write**: write to the store, then clear the family's
//!   whole cache (snapshot and every per-id entry) before returning
//! - **Generation guard**: a load captures the cache generation before it
//!   starts; if an invalidation lands while the store call is in flight the
//!   loaded value is returned to the caller but not cached
//! - **Bounded calls**: every store call runs under the configured deadline
//!   and is timed into [`QueryTimings`]

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use storefront_common::cache::{CacheStats, EntityCache};
use storefront_common::time::run_with_deadline;
use storefront_domain::constants::{SLOW_QUERY_THRESHOLD_MS, STORE_TIMEOUT_MS};
use storefront_domain::{
    ApplicationLog, EntityKind, Identified, LogKind, LogLevel, Result, StorefrontError,
};
use tracing::{debug, info, warn};

use super::timings::QueryTimings;
use crate::store_ports::{ApplicationLogStore, PersistentStore};

/// Bound satisfied by every cached entity type
pub trait Entity: Identified + Clone + Send + Sync + 'static {}

impl<T> Entity for T where T: Identified + Clone + Send + Sync + 'static {}

/// Cache type used by entity services
pub type IdCache<T> = EntityCache<i64, T>;

/// Composes one family's cache with its store.
pub struct EntityService<T: Entity> {
    kind: EntityKind,
    store: Arc<dyn PersistentStore<T>>,
    cache: IdCache<T>,
    timeout: Duration,
    timings: Arc<QueryTimings>,
    slow_query_log: Option<Arc<dyn ApplicationLogStore>>,
}

impl<T: Entity> EntityService<T> {
    /// A service with the default store timeout, a private timing recorder
    /// and no slow-query log
    pub fn new(kind: EntityKind, store: Arc<dyn PersistentStore<T>>, cache: IdCache<T>) -> Self {
        Self {
            kind,
            store,
            cache,
            timeout: Duration::from_millis(STORE_TIMEOUT_MS),
            timings: Arc::new(QueryTimings::new()),
            slow_query_log: None,
        }
    }

    /// Bound every store call by `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record store call latencies into a shared recorder
    #[must_use]
    pub fn with_timings(mut self, timings: Arc<QueryTimings>) -> Self {
        self.timings = timings;
        self
    }

    /// Persist a slow-query event whenever a store call exceeds the
    /// slow-query threshold
    #[must_use]
    pub fn with_slow_query_log(mut self, log: Arc<dyn ApplicationLogStore>) -> Self {
        self.slow_query_log = Some(log);
        self
    }

    /// Entity family this service fronts
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The family cache, for inspection
    pub fn cache(&self) -> &IdCache<T> {
        &self.cache
    }

    pub fn timings(&self) -> &Arc<QueryTimings> {
        &self.timings
    }

    /// Counters and sizes of the family cache
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The whole collection, served from the snapshot while it is valid.
    ///
    /// The returned vector is an owned copy; mutating it never affects the
    /// cache.
    pub async fn get_all(&self) -> Result<Vec<T>> {
        if let Some(items) = self.cache.get_snapshot() {
            debug!(cache = self.cache.name(), count = items.len(), "snapshot hit");
            return Ok(items);
        }

        let seen = self.cache.generation();
        let items = self.call("get_all", self.store.get_all()).await?;
        if !self.cache.put_all_if_current(seen, items.clone(), |item| item.id()) {
            debug!(cache = self.cache.name(), "discarded load raced by invalidation");
        }
        Ok(items)
    }

    /// One entity by id; `Ok(None)` when the store has no such row
    pub async fn get_by_id(&self, id: i64) -> Result<Option<T>> {
        if let Some(item) = self.cache.get(&id) {
            return Ok(Some(item));
        }

        let seen = self.cache.generation();
        let found = self.call("get_by_id", self.store.get_by_id(id)).await?;
        if let Some(item) = &found {
            self.cache.put_if_current(seen, id, item.clone());
        }
        Ok(found)
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing row is an error
    pub async fn require(&self, id: i64) -> Result<T> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("{} {id}", self.kind)))
    }

    /// Insert `entity`, returning the id the store assigned
    pub async fn add(&self, entity: &T) -> Result<i64> {
        let id = self.call("create", self.store.create(entity)).await?;
        self.after_write("create", id);
        Ok(id)
    }

    /// Returns whether a row matched. The cache is cleared whenever the
    /// store answered, matched or not.
    pub async fn update(&self, entity: &T) -> Result<bool> {
        let matched = self.call("update", self.store.update(entity)).await?;
        self.after_write("update", entity.id());
        Ok(matched)
    }

    /// Delete the row with `id`, then drop the family cache.
    ///
    /// Returns `false` when no row had that id.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let matched = self.call("delete", self.store.delete(id)).await?;
        self.after_write("delete", id);
        Ok(matched)
    }

    /// Drop everything cached for this family
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    /// Sweep expired entries; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.cache.cleanup_expired()
    }

    fn after_write(&self, operation: &'static str, id: i64) {
        self.cache.invalidate_all();
        info!(entity = %self.kind, operation, id, "store write applied; cache invalidated");
    }

    async fn call<R, F>(&self, operation: &'static str, fut: F) -> Result<R>
    where
        F: Future<Output = Result<R>> + Send,
    {
        let label = format!("{}.{operation}", self.kind.cache_name());
        let started = Instant::now();
        let outcome = run_with_deadline(&label, self.timeout, fut).await;
        let elapsed = started.elapsed();

        self.timings.record(&label, elapsed);
        debug!(
            entity = %self.kind,
            operation,
            duration_ms = elapsed.as_millis() as u64,
            "store call finished"
        );
        if elapsed >= Duration::from_millis(SLOW_QUERY_THRESHOLD_MS) {
            self.note_slow_query(&label, elapsed, self.timeout.saturating_sub(elapsed)).await;
        }

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(entity = %self.kind, operation, error = %err, "store call failed");
                Err(err)
            }
            Err(deadline) => Err(StorefrontError::Timeout(deadline.to_string())),
        }
    }

    /// Warn about a slow store call and persist it to the log store
    ///
    /// The append shares the call's budget: it gets whatever `remaining`
    /// time the store call left over.
    async fn note_slow_query(&self, label: &str, elapsed: Duration, remaining: Duration) {
        let execution_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        warn!(operation = label, duration_ms = execution_ms, "slow store call");

        let Some(log) = &self.slow_query_log else {
            return;
        };
        let event = ApplicationLog::new(
            LogLevel::Warning,
            self.kind.cache_name(),
            format!("{label} took {execution_ms}ms"),
        )
        .with_kind(LogKind::SlowQuery {
            query: label.to_string(),
            execution_ms,
            records_affected: None,
        });
        match run_with_deadline("application_logs.append", remaining, log.append(&event)).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => warn!(error = %err, "failed to persist slow query event"),
            Err(deadline) => warn!(error = %deadline, "dropped slow query event"),
        }
    }
}

impl<T: Entity> std::fmt::Debug for EntityService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("kind", &self.kind)
            .field("cache", &self.cache)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
