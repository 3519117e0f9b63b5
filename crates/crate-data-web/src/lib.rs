//! HTTP interface for crate-data
//!
//! Each enabled backend gets the same CRUD surface under
//! `{api_prefix}/{dialect}/{table}[/{id}]`. Writes and failures answer with
//! RFC 9457 problem documents; reads answer with plain JSON records.

pub mod error;
pub mod middleware;
pub mod problem;
pub mod routes;
mod server;

pub use error::{Result, WebError};
pub use problem::{Instance, ProblemDetails};
pub use server::{build_router, start_server, Backends};
