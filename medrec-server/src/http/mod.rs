//! HTTP layer
//!
//! Axum server with localhost CORS by default, request tracing, graceful
//! shutdown and JSON error bodies carrying a localizable `messageKey`.

pub mod error;
pub mod extractors;
pub mod query;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
