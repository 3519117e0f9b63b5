//! MySQL dialect

use super::{json_single_entry, json_string_array, Dialect, DialectKind};
use crate::error::DataResult;
use crate::query::Bindings;
use crate::record::{SqlParam, SqlQuery};
use crate::table::TableRef;

/// Positional `?` placeholders, `JSON_CONTAINS` containment
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn parse_table(&self, reference: &str) -> DataResult<TableRef> {
        TableRef::qualified(reference)
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn columns_query(&self, table: &TableRef) -> SqlQuery {
        SqlQuery::new(
            "SELECT column_name AS column_name FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
            vec![
                SqlParam::from(table.schema().unwrap_or_default()),
                SqlParam::from(table.table()),
            ],
        )
    }

    fn like_expr(&self, field: &str, needle: &str, bindings: &mut Bindings<'_>) -> String {
        format!("POSITION({} IN {field}) > 0", bindings.bind(needle))
    }

    fn json_array_contains_expr(
        &self,
        field: &str,
        values: &[String],
        bindings: &mut Bindings<'_>,
    ) -> String {
        format!(
            "JSON_CONTAINS({field}, {})",
            bindings.bind(json_string_array(values))
        )
    }

    fn json_object_contains_expr(
        &self,
        field: &str,
        key: &str,
        value: &str,
        bindings: &mut Bindings<'_>,
    ) -> String {
        format!(
            "JSON_CONTAINS({field}, {}, '$')",
            bindings.bind(json_single_entry(key, value))
        )
    }

    /// Backslash is an escape character under the default SQL mode
    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}
