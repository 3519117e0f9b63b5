//! Record CRUD routes for one backend

use crate::error::WebError;
use crate::problem::{Instance, ProblemDetails};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use crate_data_core::service::ID_COLUMN;
use crate_data_core::{decode, FilterCondition, Record, RecordService};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

type Reply<T> = std::result::Result<T, ProblemDetails>;

/// Read parameters: `f` filter, `c` comma-separated columns, `l` trailing clause
#[derive(Debug, Default, Deserialize)]
struct ReadParams {
    #[serde(default)]
    f: String,
    #[serde(default)]
    c: String,
    #[serde(default)]
    l: String,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateParams {
    #[serde(default)]
    d: String,
}

impl UpdateParams {
    fn deprecate(&self) -> bool {
        matches!(self.d.as_str(), "1" | "true")
    }
}

pub fn record_routes() -> Router<Arc<RecordService>> {
    Router::new()
        .route("/{table}", post(create_record).get(list_records))
        .route(
            "/{table}/{id}",
            get(get_record).put(update_record).delete(remove_record),
        )
}

fn parse_record(body: &[u8]) -> Result<Record, WebError> {
    serde_json::from_slice::<Record>(body).map_err(|e| WebError::InvalidBody(e.to_string()))
}

fn projection(columns: &str) -> Vec<String> {
    columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect()
}

async fn create_record(
    State(service): State<Arc<RecordService>>,
    Path(table): Path<String>,
    instance: Instance,
    body: Bytes,
) -> Reply<ProblemDetails> {
    let record = parse_record(&body).map_err(|e| instance.fail(e))?;
    let id = service
        .create(&table, record)
        .await
        .map_err(|e| instance.fail(e))?;
    Ok(ProblemDetails::new(StatusCode::CREATED, id, &instance))
}

async fn list_records(
    State(service): State<Arc<RecordService>>,
    Path(table): Path<String>,
    Query(params): Query<ReadParams>,
    instance: Instance,
) -> Reply<Json<Vec<Record>>> {
    let conditions = decode(&params.f).map_err(|e| instance.fail(e))?;
    let rows = service
        .get_many(&table, &projection(&params.c), &conditions, &params.l)
        .await
        .map_err(|e| instance.fail(e))?;
    Ok(Json(rows))
}

async fn get_record(
    State(service): State<Arc<RecordService>>,
    Path((table, id)): Path<(String, String)>,
    Query(params): Query<ReadParams>,
    instance: Instance,
) -> Reply<Json<Record>> {
    let mut conditions = vec![FilterCondition::equal(ID_COLUMN, id)];
    conditions.extend(decode(&params.f).map_err(|e| instance.fail(e))?);
    let record = service
        .get_one(&table, &conditions, &params.l)
        .await
        .map_err(|e| instance.fail(e))?;
    Ok(Json(record))
}

async fn update_record(
    State(service): State<Arc<RecordService>>,
    Path((table, id)): Path<(String, String)>,
    Query(params): Query<UpdateParams>,
    instance: Instance,
    body: Bytes,
) -> Reply<ProblemDetails> {
    let mut record = parse_record(&body).map_err(|e| instance.fail(e))?;
    record.insert(ID_COLUMN.to_string(), Value::String(id));
    service
        .update(&table, record, params.deprecate())
        .await
        .map_err(|e| instance.fail(e))?;
    Ok(ProblemDetails::new(StatusCode::OK, "Updated", &instance))
}

async fn remove_record(
    State(service): State<Arc<RecordService>>,
    Path((table, id)): Path<(String, String)>,
    instance: Instance,
) -> Reply<ProblemDetails> {
    service
        .remove(&table, &id)
        .await
        .map_err(|e| instance.fail(e))?;
    Ok(ProblemDetails::new(StatusCode::OK, "Removed", &instance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_skips_blanks() {
        assert_eq!(projection("id, name,,age "), vec!["id", "name", "age"]);
        assert!(projection("").is_empty());
    }

    #[test]
    fn test_deprecate_flag() {
        for (value, expected) in [("1", true), ("true", true), ("", false), ("yes", false), ("0", false)] {
            let params = UpdateParams { d: value.to_string() };
            assert_eq!(params.deprecate(), expected, "d={value}");
        }
    }

    #[test]
    fn test_body_must_be_an_object() {
        assert!(parse_record(br#"{"name":"Jane"}"#).is_ok());
        assert!(matches!(parse_record(b"[1,2]"), Err(WebError::InvalidBody(_))));
        assert!(matches!(parse_record(b"{\"name\":"), Err(WebError::InvalidBody(_))));
    }
}
