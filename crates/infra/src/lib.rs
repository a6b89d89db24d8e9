//! # Storefront Infrastructure
//!
//! Infrastructure implementations of the core store ports.
//!
//! This crate contains:
//! - The SQLite adapter: connection pool, schema, one repository per entity
//!   family, the atomic unit of work and the application log store
//! - Conversions from rusqlite, r2d2 and blocking-task errors into
//!   [`storefront_domain::StorefrontError`]
//! - Configuration loading from the environment and config files
//! - Logging initialisation
//!
//! ## Architecture
//! - Implements traits defined in `storefront-core`
//! - Contains all blocking I/O; every store call runs on the blocking pool

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;

pub use database::*;
pub use errors::{map_join_error, map_sql_error, InfraError};
pub use observability::{init_logging, LogFormat};
