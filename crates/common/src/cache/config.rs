//! Entity cache configuration and builder
//!
//! Entity caches expire purely by age: there is no capacity bound, so the
//! only knobs are the time-to-live and whether counters are collected.

use std::time::Duration;

/// Default TTL used when a builder is finished without an explicit value.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Configuration for an [`EntityCache`](super::EntityCache)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Time-to-live measured from the moment a value is loaded
    pub ttl: Duration,

    /// Whether to collect hit/miss/invalidation counters
    pub track_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL, track_metrics: true }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Preset for a cache expiring after `ttl`, with metrics enabled
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use storefront_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl(Duration::from_secs(180));
    /// assert!(config.track_metrics);
    /// ```
    pub fn ttl(ttl: Duration) -> Self {
        Self { ttl, track_metrics: true }
    }

    /// Preset for a cache expiring after `secs` seconds
    pub fn ttl_secs(secs: u64) -> Self {
        Self::ttl(Duration::from_secs(secs))
    }
}

/// Builder for [`CacheConfig`] with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set time-to-live for entries
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.config.ttl = duration;
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
