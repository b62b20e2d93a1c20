//! medrec CLI - multi-tenant medical records backend
//!
//! - `serve`: apply migrations and run the REST API
//! - `migrate`: apply migrations only
//! - `tenant create`: register a tenant
//! - `user add`: add a user to a tenant and issue an API token

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

mod commands;
mod config;
mod tracing_setup;

use config::MedrecConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "medrec",
    author,
    version,
    about = "Multi-tenant medical records backend",
    long_about = "Tenant-scoped records for health centers, doctors, stock, patients, visits \
                  and documents, served over a JSON REST API."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Database URL (overrides ~/.medrec/config.toml)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate,
    /// Manage tenants
    Tenant(commands::tenant::TenantArgs),
    /// Manage users and tenant memberships
    User(commands::user::UserArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = config::load_dotenv();
    let cli = Cli::parse();
    let config = MedrecConfig::load()?;

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        level: config.log_level.clone(),
    })
    .ok();

    for path in &dotenv.loaded {
        debug!(path = %path.display(), "loaded .env");
    }
    for (path, error) in &dotenv.failed {
        warn!(path = %path.display(), error = %error, "failed to load .env");
    }
    match &config.source {
        Some(path) => debug!(path = %path.display(), "loaded config file"),
        None => debug!("no config file, using defaults"),
    }

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config, cli.database_url).await?,
        Commands::Migrate => commands::run_migrate(&config, cli.database_url).await?,
        Commands::Tenant(args) => commands::run_tenant(args, &config, cli.database_url).await?,
        Commands::User(args) => commands::run_user(args, &config, cli.database_url).await?,
    }
    Ok(())
}
