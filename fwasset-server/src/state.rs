//! Application state management

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use fwasset_core::{
    builtin_manifest, registry::RegistrySummary, AssetRegistry, AssetSource, Manifest,
};
use fwasset_sources::{DirSource, MemorySource};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,

    /// Where asset bytes are read from
    pub source: Arc<dyn AssetSource>,

    /// Currently active registry, replaced wholesale on reload
    pub registry: Arc<RwLock<AssetRegistry>>,
}

impl AppState {
    /// Build state with the source the config asks for
    pub fn new(config: ServerConfig) -> Result<Self> {
        let source: Arc<dyn AssetSource> = match &config.asset_root {
            Some(root) => Arc::new(DirSource::new(root)),
            None => {
                warn!("No asset root configured, every asset will be reported missing");
                Arc::new(MemorySource::new())
            }
        };
        Self::with_source(config, source)
    }

    pub fn with_source(config: ServerConfig, source: Arc<dyn AssetSource>) -> Result<Self> {
        let registry = build_registry(&config, source.as_ref())?;
        Ok(Self {
            config: Arc::new(config),
            source,
            registry: Arc::new(RwLock::new(registry)),
        })
    }

    /// Re-read the manifest and all assets. The active registry is only
    /// replaced when the new one loads.
    pub async fn reload(&self) -> Result<RegistrySummary> {
        let config = Arc::clone(&self.config);
        let source = Arc::clone(&self.source);
        let registry = tokio::task::spawn_blocking(move || build_registry(&config, source.as_ref()))
            .await
            .context("reload task failed")??;
        let summary = registry.summary();
        *self.registry.write().await = registry;
        info!("Registry reloaded");
        Ok(summary)
    }
}

/// The configured manifest file, or the builtin manifest
pub fn load_manifest(config: &ServerConfig) -> Result<Manifest> {
    match &config.manifest_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read manifest {}", path.display()))?;
            let manifest = Manifest::parse(&text)
                .with_context(|| format!("failed to parse manifest {}", path.display()))?;
            info!("Using manifest {} ({} entries)", path.display(), manifest.len());
            Ok(manifest)
        }
        None => Ok(builtin_manifest()),
    }
}

fn build_registry(config: &ServerConfig, source: &dyn AssetSource) -> Result<AssetRegistry> {
    let manifest = load_manifest(config)?;

    if let Some(expected) = config.expected_count {
        if expected != manifest.len() {
            warn!(
                "Manifest {} has {} entries, firmware tables expect {}",
                manifest.name(),
                manifest.len(),
                expected
            );
        }
    }

    Ok(AssetRegistry::load(manifest, source)?)
}
