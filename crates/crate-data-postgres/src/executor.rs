//! [`SqlExecutor`] implementation for PostgreSQL

use crate::config::PostgresConfig;
use crate::error::{PostgresError, PostgresResult};
use crate::types::{normalize, PgParam};
use async_trait::async_trait;
use crate_data_core::dialect::Postgres;
use crate_data_core::{DataResult, Dialect, Record, SqlExecutor, SqlQuery};
use deadpool_postgres::{Object, Pool};
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tracing::debug;

#[derive(Clone)]
pub struct PostgresExecutor {
    pool: Pool,
    max_lifetime: Duration,
}

impl PostgresExecutor {
    pub fn new(pool: Pool, max_lifetime: Duration) -> Self {
        Self { pool, max_lifetime }
    }

    pub fn from_config(config: &PostgresConfig) -> PostgresResult<Self> {
        Ok(Self::new(config.create_pool()?, config.connection_lifetime()))
    }

    /// Check out a connection younger than the configured lifetime
    async fn client(&self) -> PostgresResult<Object> {
        loop {
            let client = self.pool.get().await?;
            if Object::metrics(&client).age() < self.max_lifetime {
                return Ok(client);
            }
            debug!("Retiring PostgreSQL connection past its lifetime");
            drop(Object::take(client));
        }
    }

    async fn run_execute(&self, query: &SqlQuery) -> PostgresResult<u64> {
        let client = self.client().await?;
        let statement = client.prepare(&query.sql).await?;
        let params: Vec<PgParam<'_>> = query.params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        Ok(client.execute(&statement, &refs).await?)
    }

    async fn run_fetch(&self, query: &SqlQuery) -> PostgresResult<Vec<Record>> {
        let client = self.client().await?;
        let statement = client.prepare(&query.sql).await?;
        let params: Vec<PgParam<'_>> = query.params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let rows = client.query(&statement, &refs).await?;
        rows.iter()
            .map(|row| {
                let mut record = Record::new();
                for (index, column) in row.columns().iter().enumerate() {
                    record.insert(column.name().to_string(), normalize(row, index)?);
                }
                Ok(record)
            })
            .collect::<Result<Vec<_>, tokio_postgres::Error>>()
            .map_err(PostgresError::from)
    }
}

#[async_trait]
impl SqlExecutor for PostgresExecutor {
    fn dialect(&self) -> &'static dyn Dialect {
        &Postgres
    }

    async fn execute(&self, query: SqlQuery) -> DataResult<u64> {
        Ok(self.run_execute(&query).await?)
    }

    async fn fetch_all(&self, query: SqlQuery) -> DataResult<Vec<Record>> {
        Ok(self.run_fetch(&query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate_data_core::DataError;

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        let config = PostgresConfig {
            host: "127.0.0.1".into(),
            port: 1,
            ..Default::default()
        };
        let executor = PostgresExecutor::from_config(&config).unwrap();

        let err = executor
            .fetch_all(SqlQuery::new("SELECT 1", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Connection(_)));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL - run with: PGHOST=localhost cargo test -p crate-data-postgres -- --ignored"]
    async fn test_distinct_queries_leave_no_cached_statements() {
        let env = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
        let config = PostgresConfig {
            host: env("PGHOST", "localhost"),
            user: env("PGUSER", "postgres"),
            password: env("PGPASSWORD", "postgres"),
            database: env("PGDATABASE", "postgres"),
            max_connections: 1,
            ..Default::default()
        };
        let executor = PostgresExecutor::from_config(&config).unwrap();

        for offset in 0..5 {
            let sql = format!("SELECT 1 AS one LIMIT 1 OFFSET {offset}");
            executor.fetch_all(SqlQuery::new(sql, vec![])).await.unwrap();
        }

        let client = executor.client().await.unwrap();
        assert_eq!(client.statement_cache.size(), 0);
    }
}
