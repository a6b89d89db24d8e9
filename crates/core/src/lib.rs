//! # Storefront Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Store port interfaces (traits)
//! - The generic read-through [`EntityService`] and one service per entity
//!   family
//! - Atomic order placement and the shopping cart
//!
//! ## Architecture Principles
//! - Only depends on `storefront-common` and `storefront-domain`
//! - No database or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod catalog;
pub mod entity;
pub mod inventory;
pub mod orders;
pub mod query;
pub mod reviews;
pub mod user;

// Infrastructure ports
pub mod store_ports;

// Re-export specific items to avoid ambiguity
pub use catalog::{CategoryService, ProductService};
pub use entity::{Entity, EntityService, IdCache, QueryTimings, TimingSummary};
pub use inventory::InventoryService;
pub use orders::{Cart, OrderCreationCoordinator, OrderPlacement, OrderService};
pub use query::SortOrder;
pub use reviews::ReviewService;
pub use store_ports::{ApplicationLogStore, AtomicStore, CommitResult, PersistentStore, WriteStep};
pub use user::UserService;
