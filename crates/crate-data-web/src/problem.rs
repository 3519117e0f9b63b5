//! RFC 9457 problem documents
//!
//! Every non-read response, success or failure, is a problem document whose
//! `instance` is the request line (`METHOD URI`).

use crate::error::WebError;
use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
}

impl ProblemDetails {
    pub fn new(status: StatusCode, title: impl Into<String>, instance: &Instance) -> Self {
        Self {
            kind: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: String::new(),
            instance: instance.to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Client errors carry the error text; server errors are only logged
    pub fn from_error(err: &WebError, instance: &Instance) -> Self {
        let status = err.status();
        let problem = Self::new(status, err.title(), instance);
        if status.is_server_error() {
            error!(%instance, error = %err, "Request failed");
            problem
        } else {
            debug!(%instance, error = %err, "Request rejected");
            problem.with_detail(err.to_string())
        }
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Request line of the current request, `METHOD URI`
#[derive(Debug, Clone)]
pub struct Instance(String);

impl Instance {
    /// Problem document for `err` at this instance
    pub fn fail(&self, err: impl Into<WebError>) -> ProblemDetails {
        ProblemDetails::from_error(&err.into(), self)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Instance {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped URI
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        Ok(Instance(format!("{} {}", parts.method, uri)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate_data_core::DataError;

    fn instance() -> Instance {
        Instance("GET /crate-api-data/sqlite/people?f=eq,1,a,b".to_string())
    }

    #[test]
    fn test_serialized_shape() {
        let problem = ProblemDetails::new(StatusCode::CREATED, "01HZX", &instance());
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "about:blank",
                "title": "01HZX",
                "status": 201,
                "detail": "",
                "instance": "GET /crate-api-data/sqlite/people?f=eq,1,a,b"
            })
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let problem = instance().fail(DataError::QueryExecution("password=hunter2".into()));
        assert_eq!(problem.status, 500);
        assert_eq!(problem.detail, "");

        let problem = instance().fail(DataError::MissingId);
        assert_eq!(problem.status, 400);
        assert!(problem.detail.contains("id"));
    }

    #[test]
    fn test_response_uses_problem_content_type() {
        let response = ProblemDetails::new(StatusCode::NOT_FOUND, "Not found", &instance()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/problem+json"
        );
    }
}
