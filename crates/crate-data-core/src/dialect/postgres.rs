//! PostgreSQL dialect

use super::{json_single_entry, json_string_array, Dialect, DialectKind};
use crate::error::DataResult;
use crate::query::Bindings;
use crate::record::{SqlParam, SqlQuery};
use crate::table::TableRef;

/// Numbered `$n` placeholders, `jsonb` containment
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn parse_table(&self, reference: &str) -> DataResult<TableRef> {
        TableRef::qualified(reference)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn columns_query(&self, table: &TableRef) -> SqlQuery {
        SqlQuery::new(
            "SELECT column_name::text AS column_name FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 ORDER BY ordinal_position ASC",
            vec![
                SqlParam::from(table.schema().unwrap_or("public")),
                SqlParam::from(table.table()),
            ],
        )
    }

    fn like_expr(&self, field: &str, needle: &str, bindings: &mut Bindings<'_>) -> String {
        format!("strpos({field}::text, {}) > 0", bindings.bind(needle))
    }

    fn json_array_contains_expr(
        &self,
        field: &str,
        values: &[String],
        bindings: &mut Bindings<'_>,
    ) -> String {
        format!(
            "{field}::jsonb @> {}::jsonb",
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
            "{field}::jsonb @> {}::jsonb",
            bindings.bind(json_single_entry(key, value))
        )
    }
}
