//! Tenant administration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medrec_server::db::repos::TenantRepo;
use medrec_server::models::TenantName;

use super::open_database;
use crate::config::MedrecConfig;

#[derive(Parser, Debug)]
pub struct TenantArgs {
    #[command(subcommand)]
    pub command: TenantCommands,
}

#[derive(Subcommand, Debug)]
pub enum TenantCommands {
    /// Create a tenant and print its id
    Create {
        /// Display name of the tenant
        name: String,
    },
}

pub async fn run_tenant(
    args: TenantArgs,
    config: &MedrecConfig,
    database_url: Option<String>,
) -> Result<()> {
    match args.command {
        TenantCommands::Create { name } => {
            let name = TenantName::new(&name).context("Invalid tenant name")?;
            let pool = open_database(config, database_url).await?;
            let tenant = TenantRepo::new(&pool)
                .create(name)
                .await
                .context("Failed to create tenant")?;
            println!("{}", tenant.id);
        }
    }
    Ok(())
}
