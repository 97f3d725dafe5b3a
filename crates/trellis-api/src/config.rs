//! Server configuration: an optional TOML file with CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path of the SQLite database file.
    #[serde(default = "default_db")]
    pub db: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            db: default_db(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8420".to_string()
}

fn default_db() -> PathBuf {
    PathBuf::from("trellis.sqlite3")
}

/// Load configuration. `None` yields the defaults; a path must exist and
/// parse.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: Option<&Path>) -> Result<ServerConfig> {
    match path {
        None => Ok(ServerConfig::default()),
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read config file {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
        }
    }
}
