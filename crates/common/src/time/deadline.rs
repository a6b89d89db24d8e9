//! Bounded waits for calls into external collaborators
//!
//! Store round-trips are wrapped in [`run_with_deadline`]; a call that
//! outlives its budget is reported as [`DeadlineExceeded`] and its eventual
//! result is dropped.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// A bounded operation did not finish in time
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} did not complete within {}ms", .limit.as_millis())]
pub struct DeadlineExceeded {
    pub operation: String,
    pub limit: Duration,
}

/// Await `fut`, giving up after `limit`
///
/// # Errors
/// Returns [`DeadlineExceeded`] when `limit` elapses first.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use storefront_common::time::run_with_deadline;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let value = run_with_deadline("products.get_all", Duration::from_secs(1), async { 7 }).await;
/// assert_eq!(value, Ok(7));
/// # }
/// ```
pub async fn run_with_deadline<F, T>(
    operation: &str,
    limit: Duration,
    fut: F,
) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(value) => Ok(value),
        Err(_) => {
            warn!(operation, limit_ms = limit.as_millis() as u64, "operation timed out");
            Err(DeadlineExceeded { operation: operation.to_string(), limit })
        }
    }
}
