//! Parameterized statement construction
//!
//! [`QueryBuilder`] turns a column list, filter conditions and an optional
//! payload into [`SqlQuery`] values for one [`Dialect`]. Payload fields are
//! whitelisted against the column list and always emitted in column order.
//!
//! Trailing clauses and WHERE predicates are caller-trusted SQL fragments and
//! are appended verbatim.

use crate::dialect::Dialect;
use crate::error::{DataError, DataResult};
use crate::filter::FilterCondition;
use crate::record::{Record, SqlParam, SqlQuery};
use crate::table::TableRef;

/// Parameter accumulator that hands out placeholders in binding order
pub struct Bindings<'d> {
    dialect: &'d dyn Dialect,
    params: Vec<SqlParam>,
}

impl<'d> Bindings<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    /// Record `value` and return the placeholder that refers to it
    pub fn bind(&mut self, value: impl Into<SqlParam>) -> String {
        self.params.push(value.into());
        self.dialect.placeholder(self.params.len())
    }

    pub fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}

/// Raw SQL predicate placed after `WHERE` in update and delete statements.
///
/// The text is not parsed or escaped. Only construct one from trusted input,
/// or use [`WherePredicate::id_equals`] which quotes the id for the dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WherePredicate(String);

impl WherePredicate {
    pub fn raw(predicate: impl Into<String>) -> Self {
        Self(predicate.into())
    }

    /// `id = '<id>'` with the id quoted as a literal for `dialect`
    pub fn id_equals(dialect: &dyn Dialect, id: &str) -> Self {
        Self(format!("id = {}", dialect.quote_literal(id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Builds statements for a single dialect
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'d> {
    dialect: &'d dyn Dialect,
}

impl<'d> QueryBuilder<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Columns of `columns` present in `record`, in column order
    pub fn writable_columns<'c>(columns: &'c [String], record: &Record) -> Vec<&'c str> {
        columns
            .iter()
            .filter(|column| record.contains_key(column.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Catalog statement listing the columns of `table`
    pub fn columns(&self, table: &TableRef) -> SqlQuery {
        self.dialect.columns_query(table)
    }

    /// `INSERT` of the payload fields that are also table columns
    pub fn insert(&self, table: &TableRef, columns: &[String], record: &Record) -> DataResult<SqlQuery> {
        let present = Self::writable_columns(columns, record);
        if present.is_empty() {
            return Err(DataError::NoWritableColumns(table.to_string()));
        }

        let mut bindings = Bindings::new(self.dialect);
        let placeholders: Vec<String> = present
            .iter()
            .map(|column| bindings.bind(&record[*column]))
            .collect();

        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            present.join(", "),
            placeholders.join(", ")
        );
        Ok(SqlQuery::new(sql, bindings.into_params()))
    }

    /// `SELECT` with ANDed filter conditions and a verbatim trailing clause.
    ///
    /// An empty projection selects `*`; callers that need the catalog order
    /// resolve the column list first.
    pub fn select(
        &self,
        table: &TableRef,
        projection: &[String],
        conditions: &[FilterCondition],
        trailing: &str,
    ) -> SqlQuery {
        let columns = if projection.is_empty() {
            "*".to_string()
        } else {
            projection.join(", ")
        };
        let mut sql = format!("SELECT {columns} FROM {table}");

        let mut bindings = Bindings::new(self.dialect);
        let clauses: Vec<String> = conditions
            .iter()
            .map(|condition| self.condition(condition, &mut bindings))
            .collect();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let trailing = trailing.trim();
        if !trailing.is_empty() {
            sql.push(' ');
            sql.push_str(trailing);
        }

        SqlQuery::new(sql, bindings.into_params())
    }

    /// `UPDATE ... SET` of the payload fields that are also table columns
    pub fn update(
        &self,
        table: &TableRef,
        columns: &[String],
        record: &Record,
        predicate: &WherePredicate,
    ) -> DataResult<SqlQuery> {
        let present = Self::writable_columns(columns, record);
        if present.is_empty() {
            return Err(DataError::NoWritableColumns(table.to_string()));
        }

        let mut bindings = Bindings::new(self.dialect);
        let assignments: Vec<String> = present
            .iter()
            .map(|column| format!("{column} = {}", bindings.bind(&record[*column])))
            .collect();

        let sql = format!(
            "UPDATE {table} SET {} WHERE {}",
            assignments.join(", "),
            predicate.as_str()
        );
        Ok(SqlQuery::new(sql, bindings.into_params()))
    }

    /// `DELETE` with a verbatim predicate
    pub fn delete(&self, table: &TableRef, predicate: &WherePredicate) -> SqlQuery {
        SqlQuery::new(
            format!("DELETE FROM {table} WHERE {}", predicate.as_str()),
            Vec::new(),
        )
    }

    fn condition(&self, condition: &FilterCondition, bindings: &mut Bindings<'_>) -> String {
        match condition {
            FilterCondition::Compare {
                operator,
                field,
                value,
            } => {
                // Compare is only ever built from comparison operators
                let symbol = operator.comparison_symbol().unwrap_or("=");
                format!("{field} {symbol} {}", bindings.bind(value.as_str()))
            }
            FilterCondition::Like { field, value } => self.dialect.like_expr(field, value, bindings),
            FilterCondition::In { field, values } => {
                format!("{field} IN ({})", bind_list(values, bindings))
            }
            FilterCondition::NotIn { field, values } => {
                format!("{field} NOT IN ({})", bind_list(values, bindings))
            }
            FilterCondition::JsonArrayContains { field, values } => {
                self.dialect.json_array_contains_expr(field, values, bindings)
            }
            FilterCondition::JsonObjectContains { field, key, value } => {
                self.dialect.json_object_contains_expr(field, key, value, bindings)
            }
        }
    }
}

fn bind_list(values: &[String], bindings: &mut Bindings<'_>) -> String {
    values
        .iter()
        .map(|value| bindings.bind(value.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
