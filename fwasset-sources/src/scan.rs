//! Asset root scanner
//!
//! Walks an asset root and produces the manifest that lists it:
//! - relative paths use `/` and are sorted by byte order
//! - symbols follow [`derive_symbol`](fwasset_core::model::derive_symbol)
//! - two files that map to the same symbol abort the scan
//! - symlinks are skipped, never followed

use anyhow::{anyhow, bail, Context, Result};
use fwasset_core::manifest::{Manifest, DEFAULT_NAME};
use fwasset_core::model::{check_path, AssetEntry};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

const VERSION_FILE: &str = "VERSION";

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Macro name written in the manifest header
    pub name: String,

    /// Create an empty `VERSION` file at the root when there is none
    pub ensure_version: bool,

    /// Skip files and directories whose name starts with `.`
    pub skip_hidden: bool,

    /// Relative paths (files or whole directories) to leave out
    pub exclude: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            ensure_version: false,
            skip_hidden: true,
            exclude: Vec::new(),
        }
    }
}

impl ScanOptions {
    fn is_excluded(&self, rel: &str) -> bool {
        self.exclude.iter().any(|pattern| {
            let pattern = pattern.trim_end_matches('/');
            rel == pattern
                || rel
                    .strip_prefix(pattern)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Build a manifest listing every file under `root`
pub fn scan_dir(root: &Path, options: &ScanOptions) -> Result<Manifest> {
    if !root.is_dir() {
        bail!("asset root {} is not a directory", root.display());
    }

    if options.ensure_version {
        let version = root.join(VERSION_FILE);
        if !version.exists() {
            fs::write(&version, "")
                .with_context(|| format!("failed to create {}", version.display()))?;
            info!("Created empty {}", version.display());
        }
    }

    let mut paths = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || keep(root, entry, options));

    for item in walker {
        let entry = item.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.path_is_symlink() {
            debug!("Skipping symlink {}", entry.path().display());
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_path(root, entry.path())?;
        if let Err(problem) = check_path(&rel) {
            bail!("cannot list `{}`: {}", rel, problem);
        }
        paths.push(rel);
    }
    paths.sort();

    let mut symbols: HashMap<String, String> = HashMap::new();
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let entry = AssetEntry::from_path(path);
        if let Some(previous) = symbols.insert(entry.symbol.clone(), entry.path.clone()) {
            bail!(
                "`{}` and `{}` both map to symbol `{}`",
                previous,
                entry.path,
                entry.symbol
            );
        }
        entries.push(entry);
    }

    info!("Scanned {} assets under {}", entries.len(), root.display());
    Ok(Manifest::new(options.name.clone(), entries))
}

/// Hidden and excluded entries are pruned along with everything below them
fn keep(root: &Path, entry: &DirEntry, options: &ScanOptions) -> bool {
    if options.skip_hidden && entry.file_name().to_string_lossy().starts_with('.') {
        return false;
    }

    let Ok(rel) = entry.path().strip_prefix(root) else {
        return true;
    };
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if options.is_excluded(&rel) {
        debug!("Excluding {}", rel);
        return false;
    }
    true
}

/// `/`-separated path of `path` below `root`
fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;

    let mut segments = Vec::new();
    for component in rel.components() {
        let segment = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| anyhow!("non UTF-8 file name under {}", root.display()))?;
        segments.push(segment);
    }
    Ok(segments.join("/"))
}
