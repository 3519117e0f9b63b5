//! Web error type and its HTTP status mapping

use axum::http::StatusCode;
use crate_data_core::{DataError, FilterGrammarError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error(transparent)]
    Data(#[from] DataError),

    /// Body is not a JSON object
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WebError>;

impl From<FilterGrammarError> for WebError {
    fn from(err: FilterGrammarError) -> Self {
        WebError::Data(DataError::FilterGrammar(err))
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Data(DataError::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Data(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            WebError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, stable summary used as the problem title
    pub fn title(&self) -> &'static str {
        match self {
            WebError::Data(DataError::SchemaResolution(_)) => "Unknown table",
            WebError::Data(DataError::FilterGrammar(_)) => "Invalid filter",
            WebError::Data(DataError::MissingId) => "Missing id",
            WebError::Data(DataError::NoWritableColumns(_)) => "No writable columns",
            WebError::Data(DataError::NotFound(_)) => "Not found",
            WebError::InvalidBody(_) => "Invalid request body",
            _ => "Internal server error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (WebError::from(DataError::SchemaResolution("t".into())), 400),
            (WebError::from(FilterGrammarError::UnknownOpcode("zz".into())), 400),
            (WebError::from(DataError::MissingId), 400),
            (WebError::from(DataError::NoWritableColumns("t".into())), 400),
            (WebError::InvalidBody("eof".into()), 400),
            (WebError::from(DataError::NotFound("t".into())), 404),
            (WebError::from(DataError::QueryExecution("boom".into())), 500),
            (WebError::from(DataError::Connection("refused".into())), 500),
            (WebError::from(DataError::EnvelopeDecode("bad".into())), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status().as_u16(), status, "{err}");
        }
    }
}
