//! Runtime configuration.
//!
//! Two sources, both JSON: `config.json` carries the ClickHouse connection
//! settings, `~/.tushare_config.json` carries the API token. Either missing
//! or unreadable fails fast with a configuration error before any sync work
//! starts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::DEFAULT_FALLBACK_CODES;
use crate::error::{AppError, Result};

fn default_port() -> u16 {
    8123
}

/// ClickHouse connection settings (`clickhouse` section of config.json).
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    /// HTTP interface port.
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table: String,
}

impl StoreConfig {
    /// URL of the ClickHouse HTTP interface.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    clickhouse: StoreConfig,
    #[serde(default)]
    fallback_codes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    token: String,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub token: String,
    /// Universe to sync when no instrument listing is available.
    pub fallback_codes: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the default locations.
    ///
    /// `config.json` is looked up at `path` if given, then at the
    /// `TUSHARE_SYNC_CONFIG` env var, then in the working directory. The
    /// token comes from `TUSHARE_TOKEN` or `~/.tushare_config.json`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("TUSHARE_SYNC_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config.json")),
        };

        if let Ok(token) = std::env::var("TUSHARE_TOKEN") {
            let token = token.trim().to_string();
            if !token.is_empty() {
                return Self::with_token(&config_path, token);
            }
        }

        Self::from_files(&config_path, &token_path()?)
    }

    /// Load from explicit file paths.
    pub fn from_files(config_path: &Path, token_path: &Path) -> Result<Self> {
        Self::with_token(config_path, read_token_file(token_path)?)
    }

    fn with_token(config_path: &Path, token: String) -> Result<Self> {
        let file = read_config_file(config_path)?;
        Ok(Self {
            store: file.clickhouse,
            token,
            fallback_codes: file.fallback_codes.unwrap_or_else(|| {
                DEFAULT_FALLBACK_CODES.iter().map(|c| c.to_string()).collect()
            }),
        })
    }
}

fn token_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| {
        AppError::Config("HOME is not set; cannot locate ~/.tushare_config.json".to_string())
    })?;
    Ok(Path::new(&home).join(".tushare_config.json"))
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("Invalid config {}: {}", path.display(), e)))
}

fn read_token_file(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let parsed: TokenFile = serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("Invalid token file {}: {}", path.display(), e)))?;
    Ok(parsed.token)
}
