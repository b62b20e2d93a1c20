//! HTTP server command
//!
//! Applies migrations, then serves the REST API until Ctrl+C/SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use medrec_server::http::{run_server, ServerConfig};

use super::open_database;
use crate::config::MedrecConfig;

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

impl ServeArgs {
    fn server_config(&self, config: &MedrecConfig) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            bind_addr: self.bind.or(config.bind).unwrap_or(defaults.bind_addr),
            cors_permissive: self.cors_permissive || config.cors_permissive.unwrap_or(false),
        }
    }
}

pub async fn run_serve(
    args: ServeArgs,
    config: &MedrecConfig,
    database_url: Option<String>,
) -> Result<()> {
    let server_config = args.server_config(config);
    let pool = open_database(config, database_url).await?;

    tracing::info!("Starting medrec server on {}", server_config.bind_addr);
    run_server(pool, server_config)
        .await
        .context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_config_file() {
        let file = MedrecConfig {
            bind: Some("0.0.0.0:8080".parse().unwrap()),
            cors_permissive: Some(true),
            ..Default::default()
        };
        let args = ServeArgs {
            bind: Some("127.0.0.1:9000".parse().unwrap()),
            cors_permissive: false,
        };

        let resolved = args.server_config(&file);
        assert_eq!(resolved.bind_addr.port(), 9000);
        assert!(resolved.cors_permissive);
    }

    #[test]
    fn defaults_when_unset() {
        let args = ServeArgs {
            bind: None,
            cors_permissive: false,
        };
        let resolved = args.server_config(&MedrecConfig::default());
        assert_eq!(resolved.bind_addr, ServerConfig::default().bind_addr);
        assert!(!resolved.cors_permissive);
    }
}
