//! # Storefront Domain
//!
//! Business domain types and models for the storefront.
//!
//! This crate contains:
//! - Entity types (Product, Order, User, ...) and their status enums
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Money helpers and domain constants
//!
//! ## Architecture
//! - No dependencies on other storefront crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod money;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
