//! Command implementations for the medrec CLI

pub mod migrate;
pub mod serve;
pub mod tenant;
pub mod user;

use anyhow::{Context, Result};
use medrec_server::db::{create_pool_with_options, migrations, pool::DEFAULT_MAX_CONNECTIONS};
use sqlx::SqlitePool;

use crate::config::MedrecConfig;

pub use migrate::run_migrate;
pub use serve::run_serve;
pub use tenant::run_tenant;
pub use user::run_user;

/// Open the configured database and bring its schema up to date.
pub(crate) async fn open_database(
    config: &MedrecConfig,
    database_url: Option<String>,
) -> Result<SqlitePool> {
    let url = config.database_url(database_url);
    let max_connections = config.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);

    let pool = create_pool_with_options(&url, max_connections)
        .await
        .with_context(|| format!("Failed to open database {url}"))?;
    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;
    Ok(pool)
}
