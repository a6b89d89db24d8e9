//! Injectable hit/miss sinks
//!
//! Caches report every lookup outcome to a [`CacheMetricsSink`] in addition
//! to their own counters. Production wiring shares one sink across all entity
//! caches; tests inject [`RecordingMetricsSink`] to assert on read patterns,
//! or [`NoopMetricsSink`] when they do not care.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

/// Receiver for cache lookup outcomes
pub trait CacheMetricsSink: Send + Sync + fmt::Debug {
    /// A lookup on `cache` was served from memory
    fn record_hit(&self, cache: &str);

    /// A lookup on `cache` had to fall through to the store
    fn record_miss(&self, cache: &str);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl CacheMetricsSink for NoopMetricsSink {
    fn record_hit(&self, _cache: &str) {}

    fn record_miss(&self, _cache: &str) {}
}

/// Hit/miss totals for a single cache name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkCounts {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
struct AtomicCounts {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Sink that keeps per-cache totals in memory
#[derive(Debug, Default)]
pub struct RecordingMetricsSink {
    counts: DashMap<String, Arc<AtomicCounts>>,
}

impl RecordingMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, cache: &str) -> Arc<AtomicCounts> {
        if let Some(existing) = self.counts.get(cache) {
            return Arc::clone(existing.value());
        }
        Arc::clone(self.counts.entry(cache.to_string()).or_default().value())
    }

    /// Totals recorded for `cache` so far
    pub fn counts(&self, cache: &str) -> SinkCounts {
        self.counts
            .get(cache)
            .map(|entry| SinkCounts {
                hits: entry.hits.load(Ordering::Relaxed),
                misses: entry.misses.load(Ordering::Relaxed),
            })
            .unwrap_or_default()
    }

    /// Hits recorded for `cache` so far
    pub fn hits(&self, cache: &str) -> u64 {
        self.counts(cache).hits
    }

    /// Misses recorded for `cache` so far
    pub fn misses(&self, cache: &str) -> u64 {
        self.counts(cache).misses
    }

    /// All totals, sorted by cache name
    pub fn snapshot(&self) -> Vec<(String, SinkCounts)> {
        let mut all: Vec<(String, SinkCounts)> = self
            .counts
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    SinkCounts {
                        hits: entry.hits.load(Ordering::Relaxed),
                        misses: entry.misses.load(Ordering::Relaxed),
                    },
                )
            })
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Forget everything recorded so far
    pub fn reset(&self) {
        self.counts.clear();
    }
}

impl CacheMetricsSink for RecordingMetricsSink {
    fn record_hit(&self, cache: &str) {
        self.entry(cache).hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self, cache: &str) {
        self.entry(cache).misses.fetch_add(1, Ordering::Relaxed);
    }
}
