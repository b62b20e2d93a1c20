//! Console tracing for the medrec CLI
//!
//!   medrec --debug ...              # debug logging
//!   RUST_LOG=medrec_server=trace    # fine-grained control
//!
//! `RUST_LOG` wins over `--debug`, which wins over `log_level` from the
//! config file. Logs go to stderr; stdout carries command output only.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    pub debug: bool,
    /// Directive from the config file, e.g. `warn` or `medrec_server=debug`
    pub level: Option<String>,
}

impl TracingConfig {
    fn filter(&self) -> EnvFilter {
        let fallback = if self.debug {
            "debug"
        } else {
            self.level.as_deref().unwrap_or("info")
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }
}

pub fn init(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
