//! Dialect-aware data access core for crate-data
//!
//! This crate holds everything that is independent of a particular database
//! driver: the compact filter codec, the query builder, live schema
//! introspection, the generic repository and the record lifecycle service.
//!
//! ## Features
//!
//! - **Filter codec**: `opcode,count,field,value,...` query strings decoded into typed conditions
//! - **Dialects**: Postgres, MySQL and SQLite capability sets behind one [`Dialect`] trait
//! - **Live schema**: writable columns are read from the catalog on every create and update
//! - **Lifecycle**: monotonic ids, `event_time` and the `data_state` audit envelope
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate_data_core::{decode, RecordService, SqlRepository};
//! use std::sync::Arc;
//!
//! let service = RecordService::new(Arc::new(SqlRepository::new(executor)));
//! let conditions = decode("equal,2,name,Jane,age,30")?;
//! let rows = service.get_many("public.people", &[], &conditions, "ORDER BY age").await?;
//! ```

pub mod dialect;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod id;
pub mod query;
pub mod record;
pub mod repository;
pub mod schema;
pub mod service;
pub mod table;

// Re-exports
pub use dialect::{Dialect, DialectKind};
pub use envelope::{timestamp_now, DataState, TIMESTAMP_FORMAT};
pub use error::{DataError, DataResult, FilterGrammarError};
pub use filter::{decode, FilterCondition, Operator};
pub use id::IdGenerator;
pub use query::{Bindings, QueryBuilder, WherePredicate};
pub use record::{Record, SqlParam, SqlQuery};
pub use repository::{RecordRepository, SqlExecutor, SqlRepository};
pub use schema::SchemaIntrospector;
pub use service::RecordService;
pub use table::TableRef;
