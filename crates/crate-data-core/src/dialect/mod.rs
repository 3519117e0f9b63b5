//! Per-dialect SQL capabilities
//!
//! The query builder is written once against the [`Dialect`] trait. Each
//! backend contributes only what genuinely differs: placeholder syntax, the
//! substring and JSON containment fragments, table reference parsing and the
//! catalog query used to list a table's columns.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use crate::error::{DataError, DataResult};
use crate::query::Bindings;
use crate::record::SqlQuery;
use crate::table::TableRef;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Capability set a backend provides to the query builder
pub trait Dialect: Send + Sync + fmt::Debug {
    fn kind(&self) -> DialectKind;

    /// Parse a caller-supplied table reference into the parts this dialect needs
    fn parse_table(&self, reference: &str) -> DataResult<TableRef>;

    /// Placeholder for the 1-based parameter `index`
    fn placeholder(&self, index: usize) -> String;

    /// Catalog statement returning one `column_name` row per column, in ordinal order
    fn columns_query(&self, table: &TableRef) -> SqlQuery;

    /// `field` contains `needle` as a substring
    fn like_expr(&self, field: &str, needle: &str, bindings: &mut Bindings<'_>) -> String;

    /// JSON array column `field` contains every value in `values`
    fn json_array_contains_expr(
        &self,
        field: &str,
        values: &[String],
        bindings: &mut Bindings<'_>,
    ) -> String;

    /// JSON object column `field` holds `key` with string value `value`
    fn json_object_contains_expr(
        &self,
        field: &str,
        key: &str,
        value: &str,
        bindings: &mut Bindings<'_>,
    ) -> String;

    /// Render `value` as a string literal
    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// The three supported backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Postgres,
    MySql,
    Sqlite,
}

impl DialectKind {
    pub const ALL: [DialectKind; 3] = [DialectKind::Postgres, DialectKind::MySql, DialectKind::Sqlite];

    /// Lowercase name, also used as the route segment
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectKind::Postgres => "postgres",
            DialectKind::MySql => "mysql",
            DialectKind::Sqlite => "sqlite",
        }
    }

    /// Shared dialect instance for this backend
    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            DialectKind::Postgres => &Postgres,
            DialectKind::MySql => &MySql,
            DialectKind::Sqlite => &Sqlite,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "mysql" => Ok(DialectKind::MySql),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            other => Err(DataError::SchemaResolution(format!(
                "unknown dialect '{other}'"
            ))),
        }
    }
}

/// JSON text of a string array, for containment parameters
pub(crate) fn json_string_array(values: &[String]) -> String {
    Value::Array(values.iter().cloned().map(Value::String).collect()).to_string()
}

/// JSON text of a single-entry object, for containment parameters
pub(crate) fn json_single_entry(key: &str, value: &str) -> String {
    let mut object = serde_json::Map::new();
    object.insert(key.to_string(), Value::String(value.to_string()));
    Value::Object(object).to_string()
}
