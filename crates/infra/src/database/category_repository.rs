//! SQLite-backed category store.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use storefront_core::PersistentStore;
use storefront_domain::{Category, Result as DomainResult};

use super::manager::{run_blocking, DbManager};
use crate::errors::map_sql_error;

const CATEGORY_SELECT: &str =
    "SELECT category_id, name, description, parent_id, created_at FROM categories";

/// SQLite implementation of PersistentStore for categories
pub struct SqliteCategoryRepository {
    db: Arc<DbManager>,
}

impl SqliteCategoryRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersistentStore<Category> for SqliteCategoryRepository {
    async fn create(&self, category: &Category) -> DomainResult<i64> {
        let category = category.clone();
        run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO categories (name, description, parent_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![category.name, category.description, category.parent_id, category.created_at],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Option<Category>> {
        run_blocking(&self.db, move |conn| {
            conn.query_row(
                &format!("{CATEGORY_SELECT} WHERE category_id = ?1"),
                params![id],
                map_category_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    async fn get_all(&self) -> DomainResult<Vec<Category>> {
        run_blocking(&self.db, |conn| {
            let mut stmt = conn
                .prepare(&format!("{CATEGORY_SELECT} ORDER BY category_id"))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], map_category_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
    }

    async fn update(&self, category: &Category) -> DomainResult<bool> {
        let category = category.clone();
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute(
                    "UPDATE categories SET name = ?1, description = ?2, parent_id = ?3
                     WHERE category_id = ?4",
                    params![category.name, category.description, category.parent_id, category.id],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute("DELETE FROM categories WHERE category_id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }
}

fn map_category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        parent_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}
