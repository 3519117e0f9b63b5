//! [`SqlExecutor`] implementation for MySQL
//!
//! Values are bound with their record type and MySQL's implicit conversions
//! take care of comparing text against numeric columns. Result columns are
//! normalized by the type name the server reports.

use crate::config::MySqlConfig;
use crate::error::MySqlResult;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use crate_data_core::dialect::MySql as MySqlDialect;
use crate_data_core::{DataResult, Dialect, Record, SqlExecutor, SqlParam, SqlQuery, TIMESTAMP_FORMAT};
use serde_json::{Number, Value};
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::warn;

#[derive(Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &MySqlConfig) -> Self {
        Self::new(config.create_pool())
    }

    async fn run_execute(&self, query: &SqlQuery) -> MySqlResult<u64> {
        let result = bind_all(&query.sql, &query.params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn run_fetch(&self, query: &SqlQuery) -> MySqlResult<Vec<Record>> {
        let rows = bind_all(&query.sql, &query.params)
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = Record::new();
            for (index, column) in row.columns().iter().enumerate() {
                record.insert(column.name().to_string(), normalize(row, index)?);
            }
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl SqlExecutor for MySqlExecutor {
    fn dialect(&self) -> &'static dyn Dialect {
        &MySqlDialect
    }

    async fn execute(&self, query: SqlQuery) -> DataResult<u64> {
        Ok(self.run_execute(&query).await?)
    }

    async fn fetch_all(&self, query: SqlQuery) -> DataResult<Vec<Record>> {
        Ok(self.run_fetch(&query).await?)
    }
}

fn bind_all<'q>(sql: &'q str, params: &'q [SqlParam]) -> Query<'q, MySql, MySqlArguments> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, param| match param {
            SqlParam::Null => query.bind(None::<String>),
            SqlParam::Bool(b) => query.bind(*b),
            SqlParam::Int(i) => query.bind(*i),
            SqlParam::Float(f) => query.bind(*f),
            SqlParam::Text(s) => query.bind(s.as_str()),
        })
}

/// How a MySQL column type is turned into a JSON scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Double,
    Text,
    Binary,
    DateTime,
    Timestamp,
    Date,
    Time,
    Unknown,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnKind::Signed,
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" => ColumnKind::Unsigned,
        "FLOAT" => ColumnKind::Float,
        "DOUBLE" => ColumnKind::Double,
        "DECIMAL" | "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT"
        | "ENUM" | "SET" | "JSON" => ColumnKind::Text,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
            ColumnKind::Binary
        }
        "DATETIME" => ColumnKind::DateTime,
        "TIMESTAMP" => ColumnKind::Timestamp,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        _ => ColumnKind::Unknown,
    }
}

/// Column `index` of `row` as a JSON scalar.
///
/// Integers, text, temporal values and blobs become strings; floats pass
/// through as numbers.
fn normalize(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match column_kind(&type_name) {
        ColumnKind::Signed => string(row.try_get_unchecked::<i64, _>(index)?),
        ColumnKind::Unsigned => string(row.try_get_unchecked::<u64, _>(index)?),
        ColumnKind::Float => float(f64::from(row.try_get::<f32, _>(index)?)),
        ColumnKind::Double => float(row.try_get::<f64, _>(index)?),
        ColumnKind::Text => Value::String(row.try_get_unchecked::<String, _>(index)?),
        ColumnKind::Binary => lossy(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        ColumnKind::DateTime => {
            string(row.try_get::<NaiveDateTime, _>(index)?.format(TIMESTAMP_FORMAT))
        }
        ColumnKind::Timestamp => string(
            row.try_get::<DateTime<Utc>, _>(index)?
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT),
        ),
        ColumnKind::Date => string(row.try_get::<NaiveDate, _>(index)?),
        ColumnKind::Time => match row.try_get::<NaiveTime, _>(index) {
            Ok(time) => string(time),
            // Negative or >24h intervals have no clock-time form
            Err(_) => Value::String(row.try_get_unchecked::<String, _>(index)?),
        },
        ColumnKind::Unknown => match String::from_utf8(row.try_get_unchecked::<Vec<u8>, _>(index)?) {
            Ok(text) => Value::String(text),
            Err(_) => {
                warn!(column = row.column(index).name(), ty = %type_name, "Unsupported column type");
                Value::Null
            }
        },
    };
    Ok(value)
}

fn string<T: ToString>(value: T) -> Value {
    Value::String(value.to_string())
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map_or_else(|| Value::String(value.to_string()), Value::Number)
}

fn lossy(bytes: Vec<u8>) -> Value {
    Value::String(String::from_utf8_lossy(&bytes).into_owned())
}
