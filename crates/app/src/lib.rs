//! # Storefront application
//!
//! Wires the layered crates together.
//!
//! This crate contains:
//! - Application context (dependency injection over the store ports)
//! - Cache reporting, health checks and the expiry janitor
//! - The `storefront` binary entry point
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core` and `infra`
//! - Nothing below this crate knows which store backs a service

pub mod context;
pub mod utils;

pub use context::*;
