//! Table references
//!
//! Client/server dialects address tables as `schema.table`; the embedded
//! dialect uses a bare table name. References are only parsed structurally and
//! are written into generated SQL verbatim.

use crate::error::{DataError, DataResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    schema: Option<String>,
    table: String,
}

impl TableRef {
    /// Parse a `schema.table` reference
    pub fn qualified(reference: &str) -> DataResult<Self> {
        match reference.split('.').collect::<Vec<_>>().as_slice() {
            [schema, table] if !schema.is_empty() && !table.is_empty() => Ok(Self {
                schema: Some(schema.to_string()),
                table: table.to_string(),
            }),
            _ => Err(DataError::SchemaResolution(format!(
                "expected 'schema.table', got '{reference}'"
            ))),
        }
    }

    /// Parse a bare table name
    pub fn bare(reference: &str) -> DataResult<Self> {
        if reference.is_empty() || reference.contains('.') {
            return Err(DataError::SchemaResolution(format!(
                "expected a bare table name, got '{reference}'"
            )));
        }
        Ok(Self {
            schema: None,
            table: reference.to_string(),
        })
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => f.write_str(&self.table),
        }
    }
}
