//! Store ports the context is wired from

use std::sync::Arc;

use storefront_core::{ApplicationLogStore, AtomicStore, PersistentStore};
use storefront_domain::{Category, InventoryRecord, Order, Product, Review, User};
use storefront_infra::{
    DbManager, SqliteApplicationLogRepository, SqliteCategoryRepository,
    SqliteInventoryRepository, SqliteOrderRepository, SqliteProductRepository,
    SqliteReviewRepository, SqliteUnitOfWork, SqliteUserRepository,
};

/// Type alias for product store trait object
pub type DynProductStore = dyn PersistentStore<Product> + Send + Sync + 'static;

/// Type alias for category store trait object
pub type DynCategoryStore = dyn PersistentStore<Category> + Send + Sync + 'static;

/// Type alias for user store trait object
pub type DynUserStore = dyn PersistentStore<User> + Send + Sync + 'static;

/// Type alias for order store trait object
pub type DynOrderStore = dyn PersistentStore<Order> + Send + Sync + 'static;

/// Type alias for inventory store trait object
pub type DynInventoryStore = dyn PersistentStore<InventoryRecord> + Send + Sync + 'static;

/// Type alias for review store trait object
pub type DynReviewStore = dyn PersistentStore<Review> + Send + Sync + 'static;

/// Type alias for atomic unit-of-work trait object
pub type DynAtomicStore = dyn AtomicStore + Send + Sync + 'static;

/// Type alias for application log store trait object
pub type DynApplicationLogStore = dyn ApplicationLogStore + Send + Sync + 'static;

/// One store per entity family plus the atomic unit of work and the log sink
#[derive(Clone)]
pub struct StorePorts {
    pub products: Arc<DynProductStore>,
    pub categories: Arc<DynCategoryStore>,
    pub users: Arc<DynUserStore>,
    pub orders: Arc<DynOrderStore>,
    pub inventory: Arc<DynInventoryStore>,
    pub reviews: Arc<DynReviewStore>,
    pub atomic: Arc<DynAtomicStore>,
    pub logs: Arc<DynApplicationLogStore>,
}

impl StorePorts {
    /// SQLite repositories sharing one connection pool
    pub fn sqlite(db: &Arc<DbManager>) -> Self {
        Self {
            products: Arc::new(SqliteProductRepository::new(Arc::clone(db))),
            categories: Arc::new(SqliteCategoryRepository::new(Arc::clone(db))),
            users: Arc::new(SqliteUserRepository::new(Arc::clone(db))),
            orders: Arc::new(SqliteOrderRepository::new(Arc::clone(db))),
            inventory: Arc::new(SqliteInventoryRepository::new(Arc::clone(db))),
            reviews: Arc::new(SqliteReviewRepository::new(Arc::clone(db))),
            atomic: Arc::new(SqliteUnitOfWork::new(Arc::clone(db))),
            logs: Arc::new(SqliteApplicationLogRepository::new(Arc::clone(db))),
        }
    }
}

impl std::fmt::Debug for StorePorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorePorts").finish_non_exhaustive()
    }
}
