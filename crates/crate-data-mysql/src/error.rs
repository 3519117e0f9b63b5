//! Error types for the MySQL executor

use crate_data_core::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MySqlError {
    /// No connection could be opened or acquired
    #[error("Pool error: {0}")]
    Pool(String),

    /// Statement failed on the server or in the driver
    #[error("Query error: {0}")]
    Query(String),
}

/// Result type for MySQL operations
pub type MySqlResult<T> = Result<T, MySqlError>;

impl From<sqlx::Error> for MySqlError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => MySqlError::Pool(err.to_string()),
            sqlx::Error::Database(db) => MySqlError::Query(db.message().to_string()),
            other => MySqlError::Query(other.to_string()),
        }
    }
}

impl From<MySqlError> for DataError {
    fn from(err: MySqlError) -> Self {
        match err {
            MySqlError::Pool(msg) => DataError::Connection(msg),
            MySqlError::Query(msg) => DataError::QueryExecution(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_failures_are_connection_errors() {
        let err: DataError = MySqlError::from(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, DataError::Connection(_)));
    }

    #[test]
    fn test_decode_failures_are_execution_errors() {
        let err: DataError = MySqlError::from(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, DataError::QueryExecution(_)));
    }
}
