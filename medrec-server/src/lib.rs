//! medrec-server: multi-tenant medical records backend
//!
//! Tenant-scoped CRUD over health centers, doctors, catalogs, stock,
//! patients, visits and documents. Every mutation runs in one transaction,
//! is audited and hides soft-deleted rows from later reads. Rows can be
//! imported idempotently by an import hash.

pub mod auth;
pub mod db;
pub mod http;
pub mod models;
pub mod service;

pub use db::{create_pool, memory_pool, DbError};
pub use http::{build_router, run_server, ServerConfig, ServerError};
pub use service::{EntityService, ListQuery, ServiceError};
