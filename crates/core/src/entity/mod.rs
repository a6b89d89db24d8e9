//! Generic read-through service shared by every entity family

pub mod service;
pub mod timings;

pub use service::{Entity, EntityService, IdCache};
pub use timings::{QueryTimings, TimingSummary};
