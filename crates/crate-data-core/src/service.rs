//! Record lifecycle service
//!
//! Wraps a [`RecordRepository`] with identity generation and the `data_state`
//! audit envelope, identically for every dialect:
//!
//! - `create` stamps `id`, `event_time` and a fresh envelope
//! - `update` re-reads the envelope by id, stamps `updated_at` (and
//!   `deprecated` on request) and writes it back with the caller's fields
//! - `remove` is a hard delete; the `deprecated` flag is never consulted
//!
//! Update's read and write are two separate round trips. Concurrent updates
//! of the same id are last-writer-wins.

use crate::dialect::Dialect;
use crate::envelope::{timestamp_now, DataState};
use crate::error::{DataError, DataResult};
use crate::filter::FilterCondition;
use crate::id::IdGenerator;
use crate::query::WherePredicate;
use crate::record::Record;
use crate::repository::RecordRepository;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Column names stamped by the service
pub const ID_COLUMN: &str = "id";
pub const EVENT_TIME_COLUMN: &str = "event_time";
pub const DATA_STATE_COLUMN: &str = "data_state";

pub struct RecordService {
    repo: Arc<dyn RecordRepository>,
    ids: IdGenerator,
}

impl RecordService {
    pub fn new(repo: Arc<dyn RecordRepository>) -> Self {
        Self {
            repo,
            ids: IdGenerator::new(),
        }
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        self.repo.dialect()
    }

    /// Insert `record` with a generated id and a fresh envelope, returning the id
    pub async fn create(&self, table: &str, mut record: Record) -> DataResult<String> {
        let id = self.ids.next_id()?;
        let now = timestamp_now();

        record.insert(ID_COLUMN.to_string(), Value::String(id.clone()));
        record.insert(EVENT_TIME_COLUMN.to_string(), Value::String(now.clone()));
        record.insert(
            DATA_STATE_COLUMN.to_string(),
            Value::String(DataState::created(now).encode()?),
        );

        self.repo.create(table, &record).await?;
        info!(table, %id, "Record created");
        Ok(id)
    }

    /// Exactly one record matching `conditions`
    pub async fn get_one(
        &self,
        table: &str,
        conditions: &[FilterCondition],
        trailing: &str,
    ) -> DataResult<Record> {
        let trailing = format!("{} LIMIT 1", trailing.trim());
        let mut rows = self.repo.get(table, &[], conditions, trailing.trim()).await?;
        if rows.is_empty() {
            return Err(DataError::NotFound(format!("no record in {table} matches")));
        }
        Ok(rows.swap_remove(0))
    }

    /// The record whose `id` column equals `id`
    pub async fn get_by_id(&self, table: &str, id: &str) -> DataResult<Record> {
        self.get_one(table, &[FilterCondition::equal(ID_COLUMN, id)], "")
            .await
            .map_err(|e| match e {
                DataError::NotFound(_) => DataError::NotFound(format!("{table} record {id}")),
                other => other,
            })
    }

    /// Every record matching `conditions`; zero rows is an empty list
    pub async fn get_many(
        &self,
        table: &str,
        projection: &[String],
        conditions: &[FilterCondition],
        trailing: &str,
    ) -> DataResult<Vec<Record>> {
        self.repo.get(table, projection, conditions, trailing).await
    }

    /// Merge caller fields into the record named by the payload's `id`
    pub async fn update(&self, table: &str, mut record: Record, deprecate: bool) -> DataResult<()> {
        let id = match record.get(ID_COLUMN) {
            Some(Value::String(id)) => id.clone(),
            _ => return Err(DataError::MissingId),
        };

        let existing = self
            .repo
            .get(
                table,
                &[DATA_STATE_COLUMN.to_string()],
                &[FilterCondition::equal(ID_COLUMN, id.as_str())],
                "",
            )
            .await?;
        let current = existing
            .first()
            .ok_or_else(|| DataError::NotFound(format!("{table} record {id}")))?;

        let mut state = DataState::from_stored(current.get(DATA_STATE_COLUMN))?;
        state.touch(timestamp_now(), deprecate);
        record.insert(DATA_STATE_COLUMN.to_string(), Value::String(state.encode()?));

        let predicate = WherePredicate::id_equals(self.dialect(), &id);
        self.repo.update(table, &record, &predicate).await?;
        debug!(table, %id, deprecate, "Record updated");
        Ok(())
    }

    /// Hard delete of the record named by `id`
    pub async fn remove(&self, table: &str, id: &str) -> DataResult<()> {
        let predicate = WherePredicate::id_equals(self.dialect(), id);
        self.repo.remove(table, &predicate).await?;
        debug!(table, id, "Record removed");
        Ok(())
    }
}
