//! CLI configuration from `~/.medrec/config.toml`
//!
//! Every key is optional. Values resolve as: CLI flag, then environment
//! (including `.env` files), then the config file, then built-in defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://medrec.db?mode=rwc";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MedrecConfig {
    pub database_url: Option<String>,
    pub bind: Option<SocketAddr>,
    pub cors_permissive: Option<bool>,
    pub max_connections: Option<u32>,
    pub log_level: Option<String>,
    /// File the values came from; `None` when running on defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl MedrecConfig {
    /// `~/.medrec/config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".medrec").join("config.toml"))
    }

    /// Load the default config file; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    ///
    /// Tracing is not installed yet; the caller reports `source` later.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content).with_context(|| {
            format!("Failed to parse config file (invalid TOML): {}", path.display())
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Database URL from the flag/env value, else the file, else the default.
    pub fn database_url(&self, from_args: Option<String>) -> String {
        from_args
            .or_else(|| self.database_url.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned())
    }
}

/// Outcome of [`load_dotenv`], reported after tracing is installed
#[derive(Debug, Default)]
pub struct DotenvReport {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Load `.env` from the working directory, then `~/.medrec/.env`.
///
/// Variables already set in the environment win.
pub fn load_dotenv() -> DotenvReport {
    let mut report = DotenvReport::default();
    if let Ok(path) = dotenvy::dotenv() {
        report.loaded.push(path);
    }
    if let Some(home) = dirs::home_dir() {
        let env_file = home.join(".medrec").join(".env");
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => report.loaded.push(env_file),
                Err(e) => report.failed.push((env_file, e.to_string())),
            }
        }
    }
    report
}
