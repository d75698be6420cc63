use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3002;

/// Where the service listens and where it finds assets and data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub port: u16,
    pub assets_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            assets_dir: PathBuf::from("assets"),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ServiceConfig {
    /// `PORT`, `CATALOG_ASSETS_DIR` and `CATALOG_DATA_DIR`; unset or
    /// unparsable values keep the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            config.port = port;
        }
        if let Some(dir) = lookup("CATALOG_ASSETS_DIR").filter(|d| !d.is_empty()) {
            config.assets_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("CATALOG_DATA_DIR").filter(|d| !d.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
