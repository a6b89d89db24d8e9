//! SQLite-backed inventory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use storefront_core::PersistentStore;
use storefront_domain::{InventoryRecord, Result as DomainResult};

use super::manager::{run_blocking, DbManager};
use crate::errors::map_sql_error;

const INVENTORY_SELECT: &str =
    "SELECT i.inventory_id, i.product_id, p.name, i.quantity_available, i.last_updated
    FROM inventory i
    LEFT JOIN products p ON p.product_id = i.product_id";

/// SQLite implementation of PersistentStore for inventory
pub struct SqliteInventoryRepository {
    db: Arc<DbManager>,
}

impl SqliteInventoryRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersistentStore<InventoryRecord> for SqliteInventoryRepository {
    async fn create(&self, record: &InventoryRecord) -> DomainResult<i64> {
        let record = record.clone();
        run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO inventory (product_id, quantity_available, last_updated)
                 VALUES (?1, ?2, ?3)",
                params![record.product_id, record.quantity_available, Utc::now()],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Option<InventoryRecord>> {
        run_blocking(&self.db, move |conn| {
            conn.query_row(
                &format!("{INVENTORY_SELECT} WHERE i.inventory_id = ?1"),
                params![id],
                map_inventory_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    async fn get_all(&self) -> DomainResult<Vec<InventoryRecord>> {
        run_blocking(&self.db, |conn| {
            let mut stmt = conn
                .prepare(&format!("{INVENTORY_SELECT} ORDER BY i.inventory_id"))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], map_inventory_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
    }

    async fn update(&self, record: &InventoryRecord) -> DomainResult<bool> {
        let record = record.clone();
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute(
                    "UPDATE inventory SET product_id = ?1, quantity_available = ?2, last_updated = ?3
                     WHERE inventory_id = ?4",
                    params![record.product_id, record.quantity_available, Utc::now(), record.id],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute("DELETE FROM inventory WHERE inventory_id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }
}

fn map_inventory_row(row: &Row<'_>) -> rusqlite::Result<InventoryRecord> {
    Ok(InventoryRecord {
        id: row.get(0)?,
        product_id: row.get(1)?,
        product_name: row.get(2)?,
        quantity_available: row.get(3)?,
        last_updated: row.get(4)?,
    })
}
