//! HTTP surface against a SQLite backend

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use crate_data_config::ServerConfig;
use crate_data_core::{DialectKind, RecordService, SqlRepository};
use crate_data_sqlite::{SqliteConfig, SqliteExecutor, SqlitePool};
use crate_data_web::{build_router, Backends, ProblemDetails};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BASE: &str = "/crate-api-data/sqlite/people";

struct App {
    _dir: TempDir,
    router: Router,
}

fn app() -> App {
    let dir = TempDir::new().unwrap();
    let pool = SqlitePool::new(SqliteConfig::new(dir.path().join("web.db"))).unwrap();
    pool.with_connection(|conn| {
        conn.execute_batch(
            "CREATE TABLE people (
                id TEXT PRIMARY KEY,
                name TEXT,
                age INTEGER,
                event_time TEXT,
                data_state TEXT
            );",
        )?;
        Ok(())
    })
    .unwrap();

    let service = RecordService::new(Arc::new(SqlRepository::new(SqliteExecutor::new(pool))));
    let backends = Backends::new().with(DialectKind::Sqlite, Arc::new(service));
    let router = build_router(&ServerConfig::default(), &backends).unwrap();
    App { _dir: dir, router }
}

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn problem(&self) -> ProblemDetails {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(app: &App, method: Method, uri: &str, body: Option<&str>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    Reply { status, headers, body }
}

async fn create(app: &App, body: Value) -> String {
    let reply = send(app, Method::POST, BASE, Some(&body.to_string())).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    reply.problem().title
}

#[tokio::test]
async fn test_create_answers_with_problem_document() {
    let app = app();
    let reply = send(&app, Method::POST, BASE, Some(r#"{"name":"Jane","age":30}"#)).await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "application/problem+json");
    let problem = reply.problem();
    assert_eq!(problem.kind, "about:blank");
    assert_eq!(problem.status, 201);
    assert_eq!(problem.title.len(), 26);
    assert_eq!(problem.detail, "");
    assert_eq!(problem.instance, format!("POST {BASE}"));
}

#[tokio::test]
async fn test_read_back_by_id_and_filter() {
    let app = app();
    let jane = create(&app, json!({"name": "Jane", "age": 30})).await;
    create(&app, json!({"name": "John", "age": 42})).await;

    let reply = send(&app, Method::GET, &format!("{BASE}/{jane}"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let record = reply.json();
    assert_eq!(record["name"], "Jane");
    assert_eq!(record["id"], jane.as_str());

    let reply = send(&app, Method::GET, &format!("{BASE}?f=gt,1,age,35&c=id,name"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let rows = reply.json();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "John");
    assert!(rows[0].get("age").is_none());
}

#[tokio::test]
async fn test_get_by_id_combines_with_filter() {
    let app = app();
    let jane = create(&app, json!({"name": "Jane"})).await;

    let reply = send(&app, Method::GET, &format!("{BASE}/{jane}?f=eq,1,name,John"), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.problem().title, "Not found");
}

#[tokio::test]
async fn test_empty_list_is_not_an_error() {
    let app = app();
    let reply = send(&app, Method::GET, &format!("{BASE}?f=eq,1,name,Nobody"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!([]));
}

#[tokio::test]
async fn test_update_merges_path_id_and_deprecates() {
    let app = app();
    let id = create(&app, json!({"name": "Jane", "age": 30})).await;

    let reply = send(&app, Method::PUT, &format!("{BASE}/{id}?d=1"), Some(r#"{"age":31}"#)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.problem().instance, format!("PUT {BASE}/{id}?d=1"));

    let record = send(&app, Method::GET, &format!("{BASE}/{id}"), None).await.json();
    assert_eq!(record["name"], "Jane");
    assert_eq!(record["age"], "31");
    let state: Value = serde_json::from_str(record["data_state"].as_str().unwrap()).unwrap();
    assert_eq!(state["deprecated"], true);
}

#[tokio::test]
async fn test_update_of_unknown_id_is_not_found() {
    let app = app();
    let reply = send(&app, Method::PUT, &format!("{BASE}/missing"), Some(r#"{"age":1}"#)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = app();
    let id = create(&app, json!({"name": "Jane"})).await;

    let reply = send(&app, Method::DELETE, &format!("{BASE}/{id}"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.problem().title, "Removed");

    let reply = send(&app, Method::GET, &format!("{BASE}/{id}"), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_errors_are_400_with_detail() {
    let app = app();

    let reply = send(&app, Method::POST, BASE, Some(r#"{"name":"#)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.problem().title, "Invalid request body");

    let reply = send(&app, Method::GET, &format!("{BASE}?f=zz,1,name,x"), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let problem = reply.problem();
    assert_eq!(problem.title, "Invalid filter");
    assert!(!problem.detail.is_empty());

    let reply = send(&app, Method::GET, "/crate-api-data/sqlite/ghosts", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.problem().title, "Unknown table");
}

#[tokio::test]
async fn test_shared_headers_on_every_response() {
    let app = app();
    for uri in ["/health", BASE] {
        let reply = send(&app, Method::GET, uri, None).await;
        assert_eq!(reply.headers["x-api-version"], "2024-01-06");
        assert_eq!(reply.headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(reply.headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(reply.headers[header::X_XSS_PROTECTION], "1; mode=block");
    }
}

#[tokio::test]
async fn test_preflight_is_no_content_with_cors() {
    let app = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri(BASE)
        .header(header::ORIGIN, "https://app.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert!(headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .contains("PUT"));
}

#[tokio::test]
async fn test_plain_options_is_no_content() {
    let app = app();
    let reply = send(&app, Method::OPTIONS, &format!("{BASE}/anything"), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn test_unmounted_dialect_is_404() {
    let app = app();
    let reply = send(&app, Method::GET, "/crate-api-data/postgres/people", None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let reply = send(&app, Method::GET, "/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["status"], "healthy");
}
