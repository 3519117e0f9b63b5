//! Record repository
//!
//! [`RecordRepository`] is the CRUD surface the lifecycle service talks to.
//! [`SqlRepository`] implements it once for every dialect on top of a
//! backend-specific [`SqlExecutor`], which only has to run statements and
//! normalize rows.

use crate::dialect::Dialect;
use crate::error::DataResult;
use crate::filter::FilterCondition;
use crate::query::{QueryBuilder, WherePredicate};
use crate::record::{Record, SqlQuery};
use crate::schema::SchemaIntrospector;
use async_trait::async_trait;
use tracing::debug;

/// Runs parameterized statements against one store
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Dialect the executor's statements must be written in
    fn dialect(&self) -> &'static dyn Dialect;

    /// Run a statement that returns no rows, yielding the affected row count
    async fn execute(&self, query: SqlQuery) -> DataResult<u64>;

    /// Run a query and materialize every row, normalized to null or string scalars
    async fn fetch_all(&self, query: SqlQuery) -> DataResult<Vec<Record>>;
}

/// Table-agnostic CRUD over a single backend
#[async_trait]
pub trait RecordRepository: Send + Sync {
    fn dialect(&self) -> &'static dyn Dialect;

    /// Insert the payload fields that are columns of `table`
    async fn create(&self, table: &str, record: &Record) -> DataResult<()>;

    /// Read rows matching every condition; an empty projection means all columns
    async fn get(
        &self,
        table: &str,
        projection: &[String],
        conditions: &[FilterCondition],
        trailing: &str,
    ) -> DataResult<Vec<Record>>;

    /// Update the payload fields that are columns of `table` where `predicate` holds
    async fn update(&self, table: &str, record: &Record, predicate: &WherePredicate) -> DataResult<()>;

    /// Delete rows where `predicate` holds
    async fn remove(&self, table: &str, predicate: &WherePredicate) -> DataResult<()>;
}

/// [`RecordRepository`] backed by any [`SqlExecutor`]
pub struct SqlRepository<E> {
    executor: E,
}

impl<E: SqlExecutor> SqlRepository<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn builder(&self) -> QueryBuilder<'static> {
        QueryBuilder::new(self.executor.dialect())
    }

    fn introspector(&self) -> SchemaIntrospector<'_, E> {
        SchemaIntrospector::new(&self.executor)
    }
}

#[async_trait]
impl<E: SqlExecutor> RecordRepository for SqlRepository<E> {
    fn dialect(&self) -> &'static dyn Dialect {
        self.executor.dialect()
    }

    async fn create(&self, table: &str, record: &Record) -> DataResult<()> {
        let introspector = self.introspector();
        let table = introspector.resolve(table)?;
        let columns = introspector.columns(&table).await?;

        let query = self.builder().insert(&table, &columns, record)?;
        debug!(sql = %query.sql, params = query.params.len(), "Create");
        self.executor.execute(query).await?;
        Ok(())
    }

    async fn get(
        &self,
        table: &str,
        projection: &[String],
        conditions: &[FilterCondition],
        trailing: &str,
    ) -> DataResult<Vec<Record>> {
        let introspector = self.introspector();
        let table = introspector.resolve(table)?;
        let columns = if projection.is_empty() {
            introspector.columns(&table).await?
        } else {
            projection.to_vec()
        };

        let query = self.builder().select(&table, &columns, conditions, trailing);
        debug!(sql = %query.sql, params = query.params.len(), "Get");
        self.executor.fetch_all(query).await
    }

    async fn update(&self, table: &str, record: &Record, predicate: &WherePredicate) -> DataResult<()> {
        let introspector = self.introspector();
        let table = introspector.resolve(table)?;
        let columns = introspector.columns(&table).await?;

        let query = self.builder().update(&table, &columns, record, predicate)?;
        debug!(sql = %query.sql, params = query.params.len(), "Update");
        self.executor.execute(query).await?;
        Ok(())
    }

    async fn remove(&self, table: &str, predicate: &WherePredicate) -> DataResult<()> {
        let table = self.introspector().resolve(table)?;

        let query = self.builder().delete(&table, predicate);
        debug!(sql = %query.sql, "Remove");
        self.executor.execute(query).await?;
        Ok(())
    }
}
