//! Orders: queries, the cart and atomic placement

pub mod cart;
pub mod coordinator;
pub mod service;

pub use cart::Cart;
pub use coordinator::{OrderCreationCoordinator, OrderPlacement};
pub use service::OrderService;
