//! PostgreSQL backend for crate-data
//!
//! Tables are addressed as `schema.table` and column metadata comes from
//! `information_schema.columns`. Parameters are encoded from the type the
//! server infers for each placeholder, so untyped record values can be
//! bound against integer, boolean, JSON or temporal columns.

pub mod config;
pub mod error;
pub mod executor;
pub mod types;

// Re-exports
pub use config::PostgresConfig;
pub use error::{PostgresError, PostgresResult};
pub use executor::PostgresExecutor;
