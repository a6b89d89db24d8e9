//! Periodic sweep of expired cache entries

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::AppContext;

/// Handle to a running janitor task; dropping it stops the task
#[derive(Debug)]
pub struct JanitorHandle {
    interval: Duration,
    task: JoinHandle<()>,
}

impl JanitorHandle {
    pub(super) fn spawn(context: Arc<AppContext>, interval: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = context.purge_expired();
                if removed > 0 {
                    debug!(removed, "janitor swept expired cache entries");
                }
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "cache janitor started");
        Self { interval, task }
    }

    /// Time between sweeps
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the sweep task is still alive
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the task now
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for JanitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
