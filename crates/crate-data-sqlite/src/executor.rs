//! [`SqlExecutor`] implementation for SQLite
//!
//! Statements run on the blocking thread pool against the shared connection.
//! Result values are normalized so integers and blobs come back as strings.

use crate::connection::SqlitePool;
use crate::error::{SqliteError, SqliteResult};
use async_trait::async_trait;
use crate_data_core::dialect::Sqlite;
use crate_data_core::{DataResult, Dialect, Record, SqlExecutor, SqlParam, SqlQuery};
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Number, Value};

#[derive(Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run<F, T>(&self, f: F) -> DataResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || pool.with_connection(f))
            .await
            .map_err(|e| SqliteError::Task(e.to_string()))?
            .map_err(Into::into)
    }
}

#[async_trait]
impl SqlExecutor for SqliteExecutor {
    fn dialect(&self) -> &'static dyn Dialect {
        &Sqlite
    }

    async fn execute(&self, query: SqlQuery) -> DataResult<u64> {
        self.run(move |conn| {
            let affected = conn.execute(&query.sql, params_from_iter(bind_values(&query.params)))?;
            Ok(affected as u64)
        })
        .await
    }

    async fn fetch_all(&self, query: SqlQuery) -> DataResult<Vec<Record>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&query.sql)?;
            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

            let mut rows = stmt.query(params_from_iter(bind_values(&query.params)))?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                let mut record = Record::new();
                for (index, name) in names.iter().enumerate() {
                    record.insert(name.clone(), normalize(row.get_ref(index)?));
                }
                records.push(record);
            }
            Ok(records)
        })
        .await
    }
}

fn bind_values(params: &[SqlParam]) -> Vec<SqliteValue> {
    params
        .iter()
        .map(|param| match param {
            SqlParam::Null => SqliteValue::Null,
            SqlParam::Bool(b) => SqliteValue::Integer(i64::from(*b)),
            SqlParam::Int(i) => SqliteValue::Integer(*i),
            SqlParam::Float(f) => SqliteValue::Real(*f),
            SqlParam::Text(s) => SqliteValue::Text(s.clone()),
        })
        .collect()
}

fn normalize(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::String(i.to_string()),
        ValueRef::Real(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
