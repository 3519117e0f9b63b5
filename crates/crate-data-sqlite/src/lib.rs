//! SQLite backend for crate-data
//!
//! Provides the embedded-dialect [`SqlExecutor`](crate_data_core::SqlExecutor).
//! Table references are bare names and column metadata comes from
//! `pragma_table_info`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate_data_core::{RecordService, SqlRepository};
//! use crate_data_sqlite::{SqliteConfig, SqliteExecutor, SqlitePool};
//! use std::sync::Arc;
//!
//! let pool = SqlitePool::new(SqliteConfig::new("./data.db"))?;
//! let service = RecordService::new(Arc::new(SqlRepository::new(SqliteExecutor::new(pool))));
//! let id = service.create("people", record).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod executor;

// Re-exports
pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use executor::SqliteExecutor;
