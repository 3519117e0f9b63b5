//! Live column introspection
//!
//! Column lists are fetched from the catalog on every call. Nothing is cached,
//! so schema changes are visible to the very next operation.

use crate::error::{DataError, DataResult};
use crate::repository::SqlExecutor;
use crate::table::TableRef;
use serde_json::Value;
use tracing::debug;

/// Resolves table references to their ordered column names
pub struct SchemaIntrospector<'e, E: ?Sized> {
    executor: &'e E,
}

impl<'e, E: SqlExecutor + ?Sized> SchemaIntrospector<'e, E> {
    pub fn new(executor: &'e E) -> Self {
        Self { executor }
    }

    /// Parse `reference` into the parts the executor's dialect requires
    pub fn resolve(&self, reference: &str) -> DataResult<TableRef> {
        self.executor.dialect().parse_table(reference)
    }

    /// Column names of `table` in catalog ordinal order
    pub async fn columns(&self, table: &TableRef) -> DataResult<Vec<String>> {
        let query = self.executor.dialect().columns_query(table);
        let rows = self.executor.fetch_all(query).await?;

        let columns: Vec<String> = rows
            .into_iter()
            .filter_map(|mut row| match row.remove("column_name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            })
            .collect();

        if columns.is_empty() {
            return Err(DataError::SchemaResolution(format!(
                "table {table} does not exist or has no visible columns"
            )));
        }

        debug!(%table, count = columns.len(), "Resolved columns");
        Ok(columns)
    }
}
