//! SQLite-backed review store.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use storefront_core::PersistentStore;
use storefront_domain::{Result as DomainResult, Review};

use super::manager::{run_blocking, DbManager};
use crate::errors::map_sql_error;

const REVIEW_SELECT: &str =
    "SELECT review_id, user_id, product_id, rating, comment, review_date FROM reviews";

/// SQLite implementation of PersistentStore for reviews
pub struct SqliteReviewRepository {
    db: Arc<DbManager>,
}

impl SqliteReviewRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersistentStore<Review> for SqliteReviewRepository {
    async fn create(&self, review: &Review) -> DomainResult<i64> {
        let review = review.clone();
        run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO reviews (user_id, product_id, rating, comment, review_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    review.user_id,
                    review.product_id,
                    review.rating,
                    review.comment,
                    review.review_date
                ],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> DomainResult<Option<Review>> {
        run_blocking(&self.db, move |conn| {
            conn.query_row(
                &format!("{REVIEW_SELECT} WHERE review_id = ?1"),
                params![id],
                map_review_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    async fn get_all(&self) -> DomainResult<Vec<Review>> {
        run_blocking(&self.db, |conn| {
            let mut stmt = conn
                .prepare(&format!("{REVIEW_SELECT} ORDER BY review_id"))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], map_review_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
    }

    async fn update(&self, review: &Review) -> DomainResult<bool> {
        let review = review.clone();
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute(
                    "UPDATE reviews SET rating = ?1, comment = ?2 WHERE review_id = ?3",
                    params![review.rating, review.comment, review.id],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        run_blocking(&self.db, move |conn| {
            let changed = conn
                .execute("DELETE FROM reviews WHERE review_id = ?1", params![id])
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
    }
}

fn map_review_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        rating: row.get(3)?,
        comment: row.get(4)?,
        review_date: row.get(5)?,
    })
}
