//! Generic building blocks shared across storefront crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error derive only
//! - `runtime`: entity cache, clocks and deadlines (pulls in tokio,
//!   parking_lot, dashmap)
//! - `observability`: tracing (enabled by `runtime`)
//! - `test-utils`: everything in `runtime`, for downstream test suites

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{
    CacheConfig, CacheMetricsSink, CacheStats, EntityCache, Generation, NoopMetricsSink,
    RecordingMetricsSink,
};
#[cfg(feature = "runtime")]
pub use time::{run_with_deadline, Clock, DeadlineExceeded, MockClock, SystemClock};
