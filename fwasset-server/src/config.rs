//! Server configuration
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. a JSON file: `$FWASSET_CONFIG`, else `<config dir>/fwasset/server.json`
//! 3. `FWASSET_*` environment variables

use anyhow::{bail, Context, Result};
use fwasset_core::manifest::DEFAULT_NAME;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_ENV: &str = "FWASSET_CONFIG";
pub const BIND_ENV: &str = "FWASSET_BIND";
pub const ASSET_ROOT_ENV: &str = "FWASSET_ASSET_ROOT";
pub const MANIFEST_ENV: &str = "FWASSET_MANIFEST";
pub const EXPECTED_COUNT_ENV: &str = "FWASSET_EXPECTED_COUNT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Directory holding the built web UI; without it every asset is missing
    #[serde(default)]
    pub asset_root: Option<PathBuf>,

    /// X-macro manifest file; the builtin manifest is used when unset
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    /// Macro name used when scanning the asset root
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Entry count the firmware tables were generated for
    #[serde(default)]
    pub expected_count: Option<usize>,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9180))
}

fn default_manifest_name() -> String {
    DEFAULT_NAME.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            asset_root: None,
            manifest_path: None,
            manifest_name: default_manifest_name(),
            expected_count: None,
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fwasset").join("server.json"))
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Apply `FWASSET_*` overrides from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind = bind
                .parse()
                .with_context(|| format!("{BIND_ENV}: invalid address `{bind}`"))?;
        }
        if let Some(root) = lookup(ASSET_ROOT_ENV) {
            self.asset_root = non_empty(root).map(PathBuf::from);
        }
        if let Some(manifest) = lookup(MANIFEST_ENV) {
            self.manifest_path = non_empty(manifest).map(PathBuf::from);
        }
        if let Some(count) = lookup(EXPECTED_COUNT_ENV) {
            self.expected_count = match non_empty(count) {
                Some(count) => Some(
                    count
                        .parse()
                        .with_context(|| format!("{EXPECTED_COUNT_ENV}: invalid count `{count}`"))?,
                ),
                None => None,
            };
        }
        Ok(())
    }

    /// Load from the config file (if any) and the process environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let path = PathBuf::from(path);
                if !path.is_file() {
                    bail!("{CONFIG_ENV} points at missing file {}", path.display());
                }
                info!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            Err(_) => match default_config_path() {
                Some(path) if path.is_file() => {
                    info!("Loading config from {}", path.display());
                    Self::from_file(&path)?
                }
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
