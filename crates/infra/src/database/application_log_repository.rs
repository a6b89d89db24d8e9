//! Application log events stored as JSON documents.
//!
//! Only the level and timestamp are broken out into columns; everything else,
//! including the kind-specific metadata, lives in the document.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Row};
use storefront_core::ApplicationLogStore;
use storefront_domain::{ApplicationLog, LogLevel, Result as DomainResult};

use super::manager::{run_blocking, DbManager};
use crate::errors::{map_sql_error, InfraError};

/// SQLite implementation of ApplicationLogStore
pub struct SqliteApplicationLogRepository {
    db: Arc<DbManager>,
}

impl SqliteApplicationLogRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ApplicationLogStore for SqliteApplicationLogRepository {
    async fn append(&self, log: &ApplicationLog) -> DomainResult<i64> {
        let document = serde_json::to_string(log).map_err(InfraError::from)?;
        let level = log.level.to_string();
        let logged_at = log.timestamp;

        run_blocking(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO application_logs (level, logged_at, document) VALUES (?1, ?2, ?3)",
                params![level, logged_at, document],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn by_level(&self, level: LogLevel) -> DomainResult<Vec<ApplicationLog>> {
        let level = level.to_string();
        let rows = run_blocking(&self.db, move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT log_id, document FROM application_logs WHERE level = ?1
                     ORDER BY log_id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![level], map_document_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await?;
        decode_documents(rows)
    }

    async fn recent(&self, limit: usize) -> DomainResult<Vec<ApplicationLog>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = run_blocking(&self.db, move |conn| {
            let mut stmt = conn
                .prepare("SELECT log_id, document FROM application_logs ORDER BY log_id DESC LIMIT ?1")
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![limit], map_document_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await?;
        decode_documents(rows)
    }
}

fn map_document_row(row: &Row<'_>) -> rusqlite::Result<(i64, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn decode_documents(rows: Vec<(i64, String)>) -> DomainResult<Vec<ApplicationLog>> {
    rows.into_iter()
        .map(|(id, document)| -> DomainResult<ApplicationLog> {
            let mut log: ApplicationLog =
                serde_json::from_str(&document).map_err(InfraError::from)?;
            log.id = id;
            Ok(log)
        })
        .collect()
}
