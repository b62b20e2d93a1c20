//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool - no Arc<Mutex<Connection>>
//! - Every entity query is scoped by tenant and hides soft-deleted rows
//! - Rely on DB constraints, handle conflicts - no check-then-insert for uniqueness
//! - Mutations run on a caller-supplied transaction

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options, memory_pool};
pub use repos::DbError;
