//! SQLite adapter for the store ports

mod columns;
pub mod manager;
pub mod pool;

pub mod application_log_repository;
pub mod category_repository;
pub mod inventory_repository;
pub mod order_repository;
pub mod product_repository;
pub mod review_repository;
pub mod unit_of_work;
pub mod user_repository;

pub use application_log_repository::SqliteApplicationLogRepository;
pub use category_repository::SqliteCategoryRepository;
pub use inventory_repository::SqliteInventoryRepository;
pub use manager::{run_blocking, with_transaction, DbManager, SCHEMA_VERSION};
pub use order_repository::SqliteOrderRepository;
pub use pool::{SqliteConnection, SqlitePool, SqlitePoolConfig};
pub use product_repository::SqliteProductRepository;
pub use review_repository::SqliteReviewRepository;
pub use unit_of_work::SqliteUnitOfWork;
pub use user_repository::SqliteUserRepository;
