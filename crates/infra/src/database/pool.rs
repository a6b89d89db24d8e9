//! SQLite connection pool
//!
//! Builds an r2d2 pool of rusqlite connections and applies the
//! per-connection pragmas every storefront connection runs with.

use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use storefront_domain::Result;
use tracing::warn;

use crate::errors::InfraError;

/// Connection pool over SQLite
pub type SqlitePool = Pool<SqliteConnectionManager>;
/// A connection checked out of the pool
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

/// Pool sizing and pragma settings
#[derive(Debug, Clone)]
pub struct SqlitePoolConfig {
    /// Maximum open connections (default: 8)
    pub max_size: u32,
    /// How long `get` waits for a free connection (default: 5s)
    pub connection_timeout: Duration,
    /// SQLite busy handler timeout (default: 5s)
    pub busy_timeout: Duration,
    /// Enable WAL mode (default: true)
    pub enable_wal: bool,
    /// Enable foreign keys (default: true)
    pub enable_foreign_keys: bool,
}

impl Default for SqlitePoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

/// Apply connection-level pragmas
///
/// - WAL journal with autocheckpoint every 1000 pages
/// - NORMAL synchronous mode
/// - Foreign key enforcement
/// - Busy timeout for lock contention
pub fn apply_connection_pragmas(
    conn: &Connection,
    config: &SqlitePoolConfig,
) -> rusqlite::Result<()> {
    let mut pragma_sql = String::new();

    if config.enable_wal {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\n");
        pragma_sql.push_str("PRAGMA wal_autocheckpoint=1000;\n");
    }

    pragma_sql.push_str("PRAGMA synchronous=NORMAL;\n");

    // Bundled SQLite enables foreign keys by default, so both states are explicit
    if config.enable_foreign_keys {
        pragma_sql.push_str("PRAGMA foreign_keys=ON;\n");
    } else {
        pragma_sql.push_str("PRAGMA foreign_keys=OFF;\n");
    }

    conn.execute_batch(&pragma_sql)?;
    conn.busy_timeout(config.busy_timeout)
}

/// Build a pool for the database file at `path`.
pub fn create_pool(path: &Path, config: SqlitePoolConfig) -> Result<SqlitePool> {
    let pragmas = config.clone();
    let manager = SqliteConnectionManager::file(path)
        .with_init(move |conn| apply_connection_pragmas(conn, &pragmas));

    Pool::builder()
        .max_size(config.max_size.max(1))
        .connection_timeout(config.connection_timeout)
        .build(manager)
        .map_err(|e| {
            warn!(db_path = %path.display(), error = %e, "failed to create connection pool");
            InfraError::from(e).into()
        })
}

#[cfg(test)]
mod tests {
    //! Unit tests for database::pool.
    use tempfile::TempDir;

    use super::*;

    /// Validates that pooled connections come up with the configured pragmas.
    ///
    /// Assertions:
    /// - Confirms `journal_mode` is `wal`.
    /// - Confirms `foreign_keys` equals `1`.
    /// - Confirms `synchronous` equals `1` (NORMAL).
    #[test]
    fn test_pool_connections_carry_pragmas() {
        let temp_dir = TempDir::new().unwrap();
        let pool =
            create_pool(&temp_dir.path().join("shop.db"), SqlitePoolConfig::default()).unwrap();
        let conn = pool.get().unwrap();

        let journal_mode: String =
            conn.pragma_query_value(None, "journal_mode", |row| row.get(0)).unwrap();
        let foreign_keys: i64 =
            conn.pragma_query_value(None, "foreign_keys", |row| row.get(0)).unwrap();
        let synchronous: i64 =
            conn.pragma_query_value(None, "synchronous", |row| row.get(0)).unwrap();

        assert_eq!(journal_mode.to_lowercase(), "wal");
        assert_eq!(foreign_keys, 1);
        assert_eq!(synchronous, 1);
    }

    #[test]
    fn test_foreign_keys_can_be_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let config = SqlitePoolConfig { enable_foreign_keys: false, ..SqlitePoolConfig::default() };
        let pool = create_pool(&temp_dir.path().join("shop.db"), config).unwrap();

        let foreign_keys: i64 =
            pool.get().unwrap().pragma_query_value(None, "foreign_keys", |row| row.get(0)).unwrap();
        assert_eq!(foreign_keys, 0);
    }
}
