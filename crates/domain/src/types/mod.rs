//! Domain types and models
//!
//! Every persisted entity carries an `i64` id assigned by the store. Values
//! built in memory before their first write use [`NEW_ID`].

pub mod cart;
pub mod catalog;
pub mod inventory;
pub mod log;
pub mod order;
pub mod review;
pub mod user;

use serde::{Deserialize, Serialize};

pub use cart::CartLine;
pub use catalog::{Category, Product};
pub use inventory::InventoryRecord;
pub use log::{ApplicationLog, LogKind, LogLevel};
pub use order::{Order, OrderLineItem, OrderStatus, OrderTotals};
pub use review::Review;
pub use user::{User, UserRole};

use crate::impl_domain_status_conversions;

/// Id carried by an entity that has not been written yet
pub const NEW_ID: i64 = 0;

/// The entity families fronted by a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    User,
    Order,
    Inventory,
    Category,
    Review,
}

impl_domain_status_conversions!(EntityKind {
    Product => "product",
    User => "user",
    Order => "order",
    Inventory => "inventory",
    Category => "category",
    Review => "review",
});

impl EntityKind {
    /// Every family, in reporting order
    pub const ALL: [Self; 6] =
        [Self::Product, Self::User, Self::Order, Self::Inventory, Self::Category, Self::Review];

    /// Name of the cache fronting this family
    pub fn cache_name(self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::User => "users",
            Self::Order => "orders",
            Self::Inventory => "inventory",
            Self::Category => "categories",
            Self::Review => "reviews",
        }
    }
}

/// Access to the store-assigned id of an entity
pub trait Identified {
    fn id(&self) -> i64;
}

macro_rules! impl_identified {
    ($($ty:ty),+ $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> i64 {
                self.id
            }
        })+
    };
}

impl_identified!(Product, Category, User, InventoryRecord, Review, Order, OrderLineItem);
