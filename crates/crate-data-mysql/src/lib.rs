//! MySQL backend for crate-data
//!
//! Tables are addressed as `schema.table` and column metadata comes from
//! `information_schema.columns`. Statements are runtime `sqlx` queries, so no
//! database is needed at compile time.

pub mod config;
pub mod error;
pub mod executor;

// Re-exports
pub use config::MySqlConfig;
pub use error::{MySqlError, MySqlResult};
pub use executor::MySqlExecutor;
