//! SQLite-backed product store.
//!
//! Rows are read with the owning category's name and the product's stock
//! level joined in. Creating a product also opens its inventory row.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use storefront_core::PersistentStore;
use storefront_domain::{Product, Result as DomainResult};

use super::columns::decimal_at;
use super::manager::{run_blocking, with_transaction, DbManager};
use crate::errors::map_sql_error;

const PRODUCT_SELECT: &str = "SELECT p.product_id, p.name, p.description, p.price,
        p.category_id, c.name, COALESCE(i.quantity_available, 0), p.created_at
    FROM products p
    LEFT JOIN categories c ON c.category_id = p.category_id
    LEFT JOIN inventory i ON i.product_id = p.product_id";

/// SQLite implementation of PersistentStore for products
pub struct SqliteProductRepository {
    db: Arc<DbManager>,
}

impl SqliteProductRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersistentStore<Product> for SqliteProductRepository {
    async fn create(&self, product: &Product) -> DomainResult<i64> {
        let product = product.clone();
        run_blocking(&self.db, move |conn| {
            with_transaction(conn, |conn| insert_product(conn, &product))
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Option<Product>> {
        run_blocking(&self.db, move |conn| {
            conn.query_row(
                &format!("{PRODUCT_SELECT} WHERE p.product_id = ?1"),
                params![id],
                map_product_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    async fn get_all(&self) -> DomainResult<Vec<Product>> {
        run_blocking(&self.db, |conn| {
            let mut stmt = conn
                .prepare(&format!("{PRODUCT_SELECT} ORDER BY p.product_id"))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], map_product_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
    }

    /// Stock is owned by the inventory store and is not written here.
    async fn update(&self, product: &Product) -> DomainResult<bool> {
        let product = product.clone();
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute(
                    "UPDATE products SET name = ?1, description = ?2, price = ?3, category_id = ?4
                     WHERE product_id = ?5",
                    params![
                        product.name,
                        product.description,
                        product.price.to_string(),
                        product.category_id,
                        product.id
                    ],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute("DELETE FROM products WHERE product_id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }
}

fn insert_product(conn: &Connection, product: &Product) -> DomainResult<i64> {
    conn.execute(
        "INSERT INTO products (name, description, price, category_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            product.name,
            product.description,
            product.price.to_string(),
            product.category_id,
            product.created_at
        ],
    )
    .map_err(map_sql_error)?;
    let id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO inventory (product_id, quantity_available, last_updated) VALUES (?1, ?2, ?3)",
        params![id, product.quantity_available, Utc::now()],
    )
    .map_err(map_sql_error)?;

    Ok(id)
}

fn map_product_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: decimal_at(row, 3)?,
        category_id: row.get(4)?,
        category_name: row.get(5)?,
        quantity_available: row.get(6)?,
        created_at: row.get(7)?,
    })
}
