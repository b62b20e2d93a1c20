//! User and membership administration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medrec_server::db::repos::{MembershipRepo, TenantRepo, UserRepo};
use medrec_server::models::{Email, Role};
use uuid::Uuid;

use super::open_database;
use crate::config::MedrecConfig;

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Add a user to a tenant and print a fresh API token
    Add(AddArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Tenant id
    #[arg(long)]
    pub tenant: Uuid,

    /// Email address of the user (created if unknown)
    #[arg(long)]
    pub email: String,

    /// Role in the tenant (admin, editor, viewer); repeatable
    #[arg(long = "role", value_name = "ROLE", default_value = "viewer")]
    pub roles: Vec<Role>,
}

pub async fn run_user(
    args: UserArgs,
    config: &MedrecConfig,
    database_url: Option<String>,
) -> Result<()> {
    match args.command {
        UserCommands::Add(args) => add(args, config, database_url).await,
    }
}

async fn add(args: AddArgs, config: &MedrecConfig, database_url: Option<String>) -> Result<()> {
    let email = Email::new(&args.email).context("Invalid email")?;
    let pool = open_database(config, database_url).await?;

    let tenant = TenantRepo::new(&pool)
        .get(args.tenant)
        .await
        .with_context(|| format!("Unknown tenant {}", args.tenant))?;

    let users = UserRepo::new(&pool);
    let user = users.upsert(email).await.context("Failed to save user")?;
    MembershipRepo::new(&pool)
        .add(tenant.id, user.id, &args.roles)
        .await
        .context("Failed to save membership")?;
    let token = users
        .issue_token(user.id)
        .await
        .context("Failed to issue API token")?;

    tracing::info!(tenant_id = %tenant.id, user_id = %user.id, "user added");
    println!("{token}");
    Ok(())
}
