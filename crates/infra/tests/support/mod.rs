//! Shared fixtures for `storefront-infra` integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use storefront_core::PersistentStore;
use storefront_domain::{Category, Product, User};
use storefront_infra::database::{
    DbManager, SqliteCategoryRepository, SqliteProductRepository, SqliteUserRepository,
};
use tempfile::TempDir;

/// Temporary migrated database that keeps its directory alive for the
/// duration of a test.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager = DbManager::new(temp_dir.path().join("storefront-test.db"), 4)
            .expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Count rows in `table`.
    pub fn count(&self, table: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Seeded ids for the standard fixture catalogue
pub struct Seeded {
    pub category_id: i64,
    pub lamp_id: i64,
    pub desk_id: i64,
    pub user_id: i64,
}

/// One category, two products (stock 5 and 1) and one customer.
pub async fn seed(db: &TestDatabase) -> Seeded {
    let categories = SqliteCategoryRepository::new(Arc::clone(&db.manager));
    let products = SqliteProductRepository::new(Arc::clone(&db.manager));
    let users = SqliteUserRepository::new(Arc::clone(&db.manager));

    let category_id = categories.create(&Category::new("Lighting")).await.unwrap();

    let mut lamp = Product::new("Desk Lamp", "Adjustable LED lamp", money(1_000), category_id);
    lamp.quantity_available = 5;
    let lamp_id = products.create(&lamp).await.unwrap();

    let mut desk = Product::new("Standing Desk", "Oak top", money(500), category_id);
    desk.quantity_available = 1;
    let desk_id = products.create(&desk).await.unwrap();

    let user_id = users.create(&User::new("Ada", "ada@example.com")).await.unwrap();

    Seeded { category_id, lamp_id, desk_id, user_id }
}
