//! Error types for the SQLite executor

use crate_data_core::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// Blocking task failed before the statement finished
    #[error("Task error: {0}")]
    Task(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<SqliteError> for DataError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => DataError::Connection(msg),
            SqliteError::Task(msg) => DataError::QueryExecution(msg),
            SqliteError::Rusqlite(e) => DataError::QueryExecution(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_failures_map_to_connection() {
        let err: DataError = SqliteError::Connection("read-only filesystem".into()).into();
        assert!(matches!(err, DataError::Connection(msg) if msg == "read-only filesystem"));
    }

    #[test]
    fn test_statement_failures_map_to_execution() {
        let err: DataError = SqliteError::Rusqlite(rusqlite::Error::InvalidQuery).into();
        assert!(matches!(err, DataError::QueryExecution(_)));
    }
}
