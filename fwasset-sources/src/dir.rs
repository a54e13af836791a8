//! Filesystem asset source
//!
//! Reads assets from an asset root directory, typically the web UI build
//! output (`dist/spa`) that the firmware image is packed from.

use anyhow::{bail, Context, Result};
use fwasset_core::model::check_path;
use fwasset_core::source::AssetSource;
use std::path::{Path, PathBuf};

pub struct DirSource {
    root: PathBuf,
    name: String,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = format!("dir:{}", root.display());
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a manifest path onto the filesystem, refusing anything that
    /// could leave the root
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if let Err(problem) = check_path(path) {
            bail!("refusing path `{}`: {}", path, problem);
        }
        Ok(path.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg)))
    }
}

impl AssetSource for DirSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        std::fs::read(&full).with_context(|| format!("failed to read {}", full.display()))
    }
}
