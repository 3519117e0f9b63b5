//! SQLite connection management
//!
//! One shared connection behind a mutex. SQLite admits a single writer, so
//! every statement is serialized on it.

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, info};

/// Thread-safe SQLite connection wrapper
#[derive(Clone)]
pub struct SqlitePool {
    conn: Arc<Mutex<Connection>>,
    config: SqliteConfig,
}

impl SqlitePool {
    /// Open the database described by `config` and apply its pragmas
    pub fn new(config: SqliteConfig) -> SqliteResult<Self> {
        info!(path = ?config.path, "Opening SQLite database");

        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = config.path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SqliteError::Connection(format!("Failed to create directory: {}", e))
                })?;
            }
            Connection::open(&config.path)?
        };

        let pool = Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        };
        pool.with_connection(|conn| pool.configure(conn))?;

        Ok(pool)
    }

    /// In-memory database for testing
    pub fn memory() -> SqliteResult<Self> {
        Self::new(SqliteConfig::memory())
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Execute a closure with the connection
    pub fn with_connection<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    fn configure(&self, conn: &Connection) -> SqliteResult<()> {
        let pragmas = self.config.pragmas();
        debug!(count = pragmas.len(), "Applying SQLite pragmas");
        conn.execute_batch(&pragmas.join("\n"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_database_is_private() {
        let first = SqlitePool::memory().unwrap();
        let second = SqlitePool::memory().unwrap();

        first
            .with_connection(|conn| Ok(conn.execute_batch("CREATE TABLE only_here (id TEXT);")?))
            .unwrap();
        let visible = second.with_connection(|conn| {
            Ok(conn.query_row(
                "SELECT count(*) FROM sqlite_master WHERE name = 'only_here'",
                [],
                |row| row.get::<_, i64>(0),
            )?)
        });
        assert_eq!(visible.unwrap(), 0);
    }

    #[test]
    fn test_file_pool_uses_wal() {
        let dir = TempDir::new().unwrap();
        let pool = SqlitePool::new(SqliteConfig::new(dir.path().join("nested/data.db")))
            .expect("Failed to create pool");

        pool.with_connection(|conn| {
            let mode: String = conn.query_row("PRAGMA journal_mode;", [], |row| row.get(0))?;
            assert_eq!(mode.to_lowercase(), "wal");
            let temp_store: i64 = conn.query_row("PRAGMA temp_store;", [], |row| row.get(0))?;
            assert_eq!(temp_store, 2);
            Ok(())
        })
        .expect("Query failed");
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let pool = SqlitePool::memory().unwrap();
        pool.with_connection(|conn| {
            let enabled: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
            assert_eq!(enabled, 1);
            Ok(())
        })
        .unwrap();
    }
}
