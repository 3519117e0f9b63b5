//! SQLite dialect

use super::{Dialect, DialectKind};
use crate::error::DataResult;
use crate::query::Bindings;
use crate::record::{SqlParam, SqlQuery};
use crate::table::TableRef;

/// Positional `?` placeholders, JSON1 functions for containment
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn parse_table(&self, reference: &str) -> DataResult<TableRef> {
        TableRef::bare(reference)
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn columns_query(&self, table: &TableRef) -> SqlQuery {
        SqlQuery::new(
            "SELECT name AS column_name FROM pragma_table_info(?) ORDER BY cid",
            vec![SqlParam::from(table.table())],
        )
    }

    fn like_expr(&self, field: &str, needle: &str, bindings: &mut Bindings<'_>) -> String {
        format!("instr({field}, {}) > 0", bindings.bind(needle))
    }

    fn json_array_contains_expr(
        &self,
        field: &str,
        values: &[String],
        bindings: &mut Bindings<'_>,
    ) -> String {
        let clauses: Vec<String> = values
            .iter()
            .map(|value| {
                format!(
                    "EXISTS (SELECT 1 FROM json_each({field}) WHERE value = {})",
                    bindings.bind(value.as_str())
                )
            })
            .collect();
        clauses.join(" AND ")
    }

    fn json_object_contains_expr(
        &self,
        field: &str,
        key: &str,
        value: &str,
        bindings: &mut Bindings<'_>,
    ) -> String {
        let path = format!("$.\"{}\"", key.replace('"', "\\\""));
        let path_ph = bindings.bind(path);
        let value_ph = bindings.bind(value);
        format!("json_extract({field}, {path_ph}) = {value_ph}")
    }
}
