//! Database connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::{params, Connection};
use storefront_domain::Result;
use tokio::task;
use tracing::{info, warn};

use super::pool::{create_pool, SqliteConnection, SqlitePool, SqlitePoolConfig};
use crate::errors::{map_join_error, map_sql_error, InfraError};

/// Version recorded after the last migration
pub const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that wraps a [`SqlitePool`].
pub struct DbManager {
    pool: SqlitePool,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        Self::with_config(
            db_path,
            SqlitePoolConfig { max_size: pool_size.max(1), ..SqlitePoolConfig::default() },
        )
    }

    /// Create a new manager with explicit pool settings.
    pub fn with_config<P: AsRef<Path>>(db_path: P, config: SqlitePoolConfig) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let pool = create_pool(&path, config)?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            "sqlite pool initialised"
        );

        Ok(Self { pool, path })
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool.get().map_err(|e| InfraError::from(e).into())
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the database is reachable and answering queries.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0)).map_err(map_sql_error)?;
        Ok(())
    }
}

impl std::fmt::Debug for DbManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbManager")
            .field("path", &self.path)
            .field("max_connections", &self.pool.max_size())
            .finish()
    }
}

/// Run `work` against a pooled connection on the blocking thread pool.
pub async fn run_blocking<T, F>(db: &Arc<DbManager>, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
{
    let db = Arc::clone(db);
    task::spawn_blocking(move || -> Result<T> {
        let conn = db.get_connection()?;
        work(&conn)
    })
    .await
    .map_err(map_join_error)?
}

/// Run `work` between `BEGIN IMMEDIATE` and `COMMIT`.
///
/// Any error from `work` or from the commit itself rolls the transaction
/// back before it is returned.
pub fn with_transaction<T>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    conn.execute_batch("BEGIN IMMEDIATE").map_err(map_sql_error)?;

    let outcome = work(conn).and_then(|value| {
        conn.execute_batch("COMMIT").map_err(map_sql_error)?;
        Ok(value)
    });

    if outcome.is_err() && !conn.is_autocommit() {
        if let Err(err) = conn.execute_batch("ROLLBACK") {
            warn!(error = %err, "rollback failed");
        }
    }
    outcome
}

fn create_schema(conn: &SqliteConnection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )
    .map_err(map_sql_error)?;
    Ok(())
}
