//! Persistent store ports.
//!
//! The cache layer only ever talks to the store through these traits. The
//! SQLite adapter lives in `storefront-infra`; tests use in-memory doubles.
//!
//! # Example
//!
//! ```no_run
//! use storefront_core::PersistentStore;
//! use storefront_domain::{Product, Result};
//!
//! async fn product_names(store: &dyn PersistentStore<Product>) -> Result<Vec<String>> {
//!     Ok(store.get_all().await?.into_iter().map(|p| p.name).collect())
//! }
//! ```

use async_trait::async_trait;
use storefront_domain::{
    ApplicationLog, LogLevel, Order, OrderLineItem, Result, StorefrontError,
};

/// CRUD access to one entity family.
///
/// `create` returns the id assigned by the store; the id carried by the
/// argument is ignored. `update` and `delete` report whether a row matched.
#[async_trait]
pub trait PersistentStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn create(&self, entity: &T) -> Result<i64>;

    async fn get_by_id(&self, id: i64) -> Result<Option<T>>;

    async fn get_all(&self) -> Result<Vec<T>>;

    async fn update(&self, entity: &T) -> Result<bool>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

/// One write inside an atomic unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStep {
    /// Insert an order row (line items on the value are ignored)
    CreateOrder(Order),
    /// Insert a line item whose `order_id` is the id generated by the
    /// `CreateOrder` step at index `order_step`
    CreateLineItem { order_step: usize, item: OrderLineItem },
    /// Add `delta` to a product's stock; fails if the result would be
    /// negative or the product has no inventory row
    AdjustStock { product_id: i64, delta: i64 },
}

impl WriteStep {
    /// Short name of the step, used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateOrder(_) => "create_order",
            Self::CreateLineItem { .. } => "create_line_item",
            Self::AdjustStock { .. } => "adjust_stock",
        }
    }
}

/// Outcome of [`AtomicStore::run_atomic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// Every step was applied and committed. Holds one id per step, in step
    /// order; `AdjustStock` steps report the product id.
    Committed(Vec<i64>),
    /// Nothing was persisted
    RolledBack(StorefrontError),
}

impl CommitResult {
    /// Whether every step of the unit was applied
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Executes a sequence of writes as a single all-or-nothing unit.
///
/// Implementations must never leave a prefix of the steps applied: any
/// failure, including one raised by the final step, rolls back every earlier
/// step. A step failure is reported as
/// `RolledBack(StorefrontError::PartialWrite { step, .. })`.
#[async_trait]
pub trait AtomicStore: Send + Sync {
    async fn run_atomic(&self, steps: Vec<WriteStep>) -> CommitResult;
}

/// Append-only application log storage.
#[async_trait]
pub trait ApplicationLogStore: Send + Sync {
    async fn append(&self, log: &ApplicationLog) -> Result<i64>;

    async fn by_level(&self, level: LogLevel) -> Result<Vec<ApplicationLog>>;

    /// Newest first
    async fn recent(&self, limit: usize) -> Result<Vec<ApplicationLog>>;
}
