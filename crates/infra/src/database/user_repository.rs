//! SQLite-backed user store.
//!
//! Emails are unique without regard to case; a duplicate insert surfaces as
//! `StorefrontError::Conflict`.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use storefront_core::PersistentStore;
use storefront_domain::{Result as DomainResult, User};

use super::columns::parsed_at;
use super::manager::{run_blocking, DbManager};
use crate::errors::map_sql_error;

const USER_SELECT: &str =
    "SELECT user_id, name, email, phone, address, role, created_at FROM users";

/// SQLite implementation of PersistentStore for users
pub struct SqliteUserRepository {
    db: Arc<DbManager>,
}

impl SqliteUserRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersistentStore<User> for SqliteUserRepository {
    async fn create(&self, user: &User) -> DomainResult<i64> {
        let user = user.clone();
        run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO users (name, email, phone, address, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.name,
                    user.email.trim(),
                    user.phone,
                    user.address,
                    user.role.to_string(),
                    user.created_at
                ],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Option<User>> {
        run_blocking(&self.db, move |conn| {
            conn.query_row(&format!("{USER_SELECT} WHERE user_id = ?1"), params![id], map_user_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
    }

    async fn get_all(&self) -> DomainResult<Vec<User>> {
        run_blocking(&self.db, |conn| {
            let mut stmt =
                conn.prepare(&format!("{USER_SELECT} ORDER BY user_id")).map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], map_user_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
    }

    async fn update(&self, user: &User) -> DomainResult<bool> {
        let user = user.clone();
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute(
                    "UPDATE users SET name = ?1, email = ?2, phone = ?3, address = ?4, role = ?5
                     WHERE user_id = ?6",
                    params![
                        user.name,
                        user.email.trim(),
                        user.phone,
                        user.address,
                        user.role.to_string(),
                        user.id
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
                .execute("DELETE FROM users WHERE user_id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        role: parsed_at(row, 5)?,
        created_at: row.get(6)?,
    })
}
