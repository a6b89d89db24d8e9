//! Store round-trip timings per operation

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use parking_lot::Mutex;

/// Aggregated samples for one operation label (e.g. `products.get_all`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingSummary {
    pub samples: u64,
    pub total: Duration,
    pub max: Duration,
}

impl TimingSummary {
    /// Mean duration over every sample
    pub fn average(&self) -> Duration {
        if self.samples == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total.as_nanos() / u128::from(self.samples);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    pub fn average_ms(&self) -> f64 {
        self.average().as_secs_f64() * 1_000.0
    }
}

/// Passive recorder of store call latencies.
///
/// Shared by every entity service of an application context. Recording never
/// fails and never influences the call being measured.
#[derive(Debug, Default)]
pub struct QueryTimings {
    entries: Mutex<BTreeMap<String, TimingSummary>>,
}

impl QueryTimings {
    /// An empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample for `operation`
    pub fn record(&self, operation: &str, elapsed: Duration) {
        let mut entries = self.entries.lock();
        let summary = entries.entry(operation.to_string()).or_default();
        summary.samples += 1;
        summary.total += elapsed;
        summary.max = summary.max.max(elapsed);
    }

    /// Aggregate for `operation`; `None` before its first sample
    pub fn summary(&self, operation: &str) -> Option<TimingSummary> {
        self.entries.lock().get(operation).copied()
    }

    /// Every recorded operation, ordered by label
    pub fn snapshot(&self) -> Vec<(String, TimingSummary)> {
        self.entries.lock().iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    /// Forget every sample
    pub fn reset(&self) {
        self.entries.lock().clear();
    }

    /// Plain-text table of every operation
    pub fn report(&self) -> String {
        let mut out = String::from("operation                      samples   avg_ms   max_ms\n");
        for (operation, summary) in self.snapshot() {
            let _ = writeln!(
                out,
                "{operation:<30} {:>7} {:>8.2} {:>8.2}",
                summary.samples,
                summary.average_ms(),
                summary.max.as_secs_f64() * 1_000.0,
            );
        }
        out
    }
}
