//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock clocks for TTL bookkeeping
//! - **[`deadline`]**: bounded waits on store calls

pub mod clock;
pub mod deadline;

pub use clock::{Clock, MockClock, SystemClock};
pub use deadline::{run_with_deadline, DeadlineExceeded};
