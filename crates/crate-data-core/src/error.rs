//! Error types for dynamic record access

use thiserror::Error;

/// Reasons a compact filter token stream is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterGrammarError {
    /// A group ended before its opcode and count were both present
    #[error("filter group starting at token {position} is missing its argument count")]
    MissingCount { position: usize },

    /// The count token is not a non-negative integer
    #[error("filter count '{token}' for opcode '{opcode}' is not a number")]
    InvalidCount { opcode: String, token: String },

    /// The declared count needs more tokens than the stream has left
    #[error("opcode '{opcode}' declares a count of {declared} but only {remaining} tokens remain")]
    Truncated {
        opcode: String,
        declared: usize,
        remaining: usize,
    },

    /// The opcode is not part of the filter vocabulary
    #[error("unknown filter opcode '{0}'")]
    UnknownOpcode(String),

    /// The count does not fit the grouping the opcode requires
    #[error("opcode '{opcode}' cannot take a count of {count}: {expected}")]
    Arity {
        opcode: String,
        count: usize,
        expected: &'static str,
    },
}

/// Error type for schema resolution, query construction, execution and lifecycle
#[derive(Error, Debug)]
pub enum DataError {
    /// Table reference does not parse for the dialect, or the table has no columns
    #[error("Schema resolution error: {0}")]
    SchemaResolution(String),

    /// Malformed compact filter
    #[error("Filter grammar error: {0}")]
    FilterGrammar(#[from] FilterGrammarError),

    /// The store rejected or failed a statement
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// A connection could not be opened or checked out of the pool
    #[error("Connection error: {0}")]
    Connection(String),

    /// Zero rows where exactly one was expected
    #[error("Not found: {0}")]
    NotFound(String),

    /// Update payload carries no `id` field
    #[error("Missing id: update payload must carry a string `id` field")]
    MissingId,

    /// Stored `data_state` is not a JSON object
    #[error("Envelope decode error: {0}")]
    EnvelopeDecode(String),

    /// None of the payload fields exist as columns of the table
    #[error("No writable columns: payload shares no field with table {0}")]
    NoWritableColumns(String),

    /// The monotonic identifier generator could not produce a new id
    #[error("Id generation error: {0}")]
    IdGeneration(String),
}

impl DataError {
    /// Whether the failure was caused by the caller's input rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DataError::SchemaResolution(_)
                | DataError::FilterGrammar(_)
                | DataError::MissingId
                | DataError::NoWritableColumns(_)
        )
    }
}

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;
