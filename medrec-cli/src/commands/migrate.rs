//! Apply the schema without starting the server

use anyhow::Result;

use super::open_database;
use crate::config::MedrecConfig;

pub async fn run_migrate(config: &MedrecConfig, database_url: Option<String>) -> Result<()> {
    let pool = open_database(config, database_url).await?;
    pool.close().await;
    println!("Schema is up to date");
    Ok(())
}
