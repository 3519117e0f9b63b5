//! SQLite connection settings

use std::path::{Path, PathBuf};

const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,

    /// Write-ahead logging with `synchronous = NORMAL`
    pub wal_mode: bool,

    pub foreign_keys: bool,

    /// How long a statement waits on a locked database
    pub busy_timeout_ms: u32,

    /// Negative values are KiB, positive values are pages
    pub cache_size: i64,
}

impl SqliteConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Private in-memory database, mostly for tests
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            wal_mode: false,
            ..Default::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }

    /// PRAGMA statements applied to every new connection, in order
    pub fn pragmas(&self) -> Vec<String> {
        let mut pragmas = Vec::new();
        if self.wal_mode {
            pragmas.push("PRAGMA journal_mode = WAL;".to_string());
            pragmas.push("PRAGMA synchronous = NORMAL;".to_string());
        }
        if self.foreign_keys {
            pragmas.push("PRAGMA foreign_keys = ON;".to_string());
        }
        pragmas.push(format!("PRAGMA busy_timeout = {};", self.busy_timeout_ms));
        pragmas.push(format!("PRAGMA cache_size = {};", self.cache_size));
        pragmas.push("PRAGMA temp_store = MEMORY;".to_string());
        pragmas
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./sqlite.db"),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5000,
            cache_size: -16000,
        }
    }
}
