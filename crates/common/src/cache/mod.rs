//! Read-through entity caching primitives
//!
//! An [`EntityCache`] holds one entity family in two views: a per-id map and
//! an optional "all entities" snapshot. Both share one TTL and one lock.
//!
//! # Features
//!
//! - **Age-based validity**: a value is served iff `now - loaded_at < ttl`
//! - **Atomic invalidation**: `invalidate_all` clears both views in one step
//! - **Generation guard**: loads that raced an invalidation are discarded
//! - **Instrumentation**: built-in counters plus an injectable
//!   [`CacheMetricsSink`]
//! - **Testable**: clock abstraction for deterministic TTL tests
//!
//! # Examples
//!
//! ## Snapshot plus per-id population
//! ```
//! use storefront_common::cache::{CacheConfig, EntityCache};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Product {
//!     id: i64,
//!     name: String,
//! }
//!
//! let cache: EntityCache<i64, Product> = EntityCache::new("products", CacheConfig::ttl_secs(300));
//!
//! let loaded = vec![
//!     Product { id: 1, name: "Lamp".into() },
//!     Product { id: 2, name: "Desk".into() },
//! ];
//! cache.put_all(loaded, |product| product.id);
//!
//! assert_eq!(cache.get(&2).map(|product| product.name), Some("Desk".to_string()));
//! assert_eq!(cache.get_snapshot().map(|all| all.len()), Some(2));
//! ```
//!
//! ## Guarded repopulation
//! ```
//! use storefront_common::cache::{CacheConfig, EntityCache};
//!
//! let cache: EntityCache<i64, String> = EntityCache::new("orders", CacheConfig::ttl_secs(180));
//!
//! let seen = cache.generation();
//! // ... store read happens here while a writer commits ...
//! cache.invalidate_all();
//!
//! assert!(!cache.put_if_current(seen, 1, "stale".to_string()));
//! assert_eq!(cache.get(&1), None);
//! ```

mod config;
mod core;
mod sink;
mod stats;

pub use core::{EntityCache, Generation};

pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_TTL};
pub use sink::{CacheMetricsSink, NoopMetricsSink, RecordingMetricsSink, SinkCounts};
pub use stats::CacheStats;
