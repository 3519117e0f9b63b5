//! Error types for the PostgreSQL executor

use crate_data_core::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostgresError {
    /// Pool could not be built or a connection could not be checked out
    #[error("Pool error: {0}")]
    Pool(String),

    /// Statement failed on the server or in the driver
    #[error("Query error: {0}")]
    Query(String),
}

/// Result type for PostgreSQL operations
pub type PostgresResult<T> = Result<T, PostgresError>;

impl From<tokio_postgres::Error> for PostgresError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db) => PostgresError::Query(db.to_string()),
            None => PostgresError::Query(err.to_string()),
        }
    }
}

impl From<deadpool_postgres::PoolError> for PostgresError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        PostgresError::Pool(err.to_string())
    }
}

impl From<PostgresError> for DataError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Pool(msg) => DataError::Connection(msg),
            PostgresError::Query(msg) => DataError::QueryExecution(msg),
        }
    }
}
