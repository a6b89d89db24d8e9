//! Stock levels

pub mod service;

pub use service::InventoryService;
