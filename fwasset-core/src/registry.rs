//! Load-time asset registry
//!
//! Maps each manifest symbol to the bytes read from an [`AssetSource`].
//! Loading rejects an invalid manifest but tolerates missing files: a
//! firmware image built from a partial asset root still boots, it just
//! has holes, and those are reported.

use crate::error::ManifestError;
use crate::manifest::Manifest;
use crate::model::{AssetEntry, AssetKind, Encoding};
use crate::source::AssetSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::{debug, info, warn};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One asset with its stored bytes
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub entry: AssetEntry,
    bytes: Vec<u8>,
    fingerprint: String,
}

impl LoadedAsset {
    fn new(entry: AssetEntry, bytes: Vec<u8>) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        let fingerprint = format!("{:016x}", hasher.finish());
        Self {
            entry,
            bytes,
            fingerprint,
        }
    }

    /// Stored bytes, still compressed for `.gz` entries
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 16 hex digit hash of the stored bytes
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Snapshot of a registry for reporting
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySummary {
    pub manifest: String,
    pub source: String,
    pub entries: usize,
    pub loaded: usize,
    pub total_bytes: usize,
    pub version: Option<String>,
    pub missing: Vec<String>,
    pub warnings: Vec<String>,
    pub loaded_at: DateTime<Utc>,
}

/// Registry of loaded assets keyed by symbol
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    manifest: Manifest,
    source: String,
    assets: HashMap<String, LoadedAsset>,
    missing: Vec<String>,
    warnings: Vec<String>,
    loaded_at: DateTime<Utc>,
}

impl AssetRegistry {
    /// Read every manifest entry from `source`
    pub fn load(manifest: Manifest, source: &dyn AssetSource) -> Result<Self, ManifestError> {
        let manifest = manifest.into_validated()?;

        let mut assets = HashMap::with_capacity(manifest.len());
        let mut missing = Vec::new();
        let mut warnings = Vec::new();

        for entry in manifest.iter() {
            match source.read(&entry.path) {
                Ok(bytes) => {
                    if let Some(problem) = content_problem(entry, &bytes) {
                        warn!("Asset {}: {}", entry, problem);
                        warnings.push(format!("{}: {}", entry.symbol, problem));
                    }
                    debug!("Loaded {} ({} bytes)", entry, bytes.len());
                    assets.insert(entry.symbol.clone(), LoadedAsset::new(entry.clone(), bytes));
                }
                Err(e) => {
                    warn!("Asset {} not available from {}: {}", entry, source.name(), e);
                    missing.push(entry.symbol.clone());
                }
            }
        }

        let registry = Self {
            manifest,
            source: source.name().to_string(),
            assets,
            missing,
            warnings,
            loaded_at: Utc::now(),
        };

        info!(
            "Loaded {} of {} assets ({} bytes) from {}",
            registry.len(),
            registry.manifest.len(),
            registry.total_bytes(),
            registry.source
        );

        Ok(registry)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn source_name(&self) -> &str {
        &self.source
    }

    pub fn get(&self, symbol: &str) -> Option<&LoadedAsset> {
        self.assets.get(symbol)
    }

    pub fn get_by_path(&self, path: &str) -> Option<&LoadedAsset> {
        self.manifest
            .get_by_path(path)
            .and_then(|entry| self.assets.get(&entry.symbol))
    }

    /// Number of entries that loaded
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Symbols the source could not provide, in manifest order
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn total_bytes(&self) -> usize {
        self.assets.values().map(LoadedAsset::len).sum()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Contents of the VERSION asset, trimmed; `None` when absent or blank
    pub fn version(&self) -> Option<String> {
        let entry = self
            .manifest
            .iter()
            .find(|e| e.kind() == AssetKind::Version)?;
        let asset = self.assets.get(&entry.symbol)?;
        let text = std::str::from_utf8(asset.bytes()).ok()?.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            manifest: self.manifest.name().to_string(),
            source: self.source.clone(),
            entries: self.manifest.len(),
            loaded: self.len(),
            total_bytes: self.total_bytes(),
            version: self.version(),
            missing: self.missing.clone(),
            warnings: self.warnings.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Sanity checks on stored bytes; these never decode anything
fn content_problem(entry: &AssetEntry, bytes: &[u8]) -> Option<String> {
    if entry.encoding() == Encoding::Gzip {
        if !bytes.starts_with(&GZIP_MAGIC) {
            return Some("missing gzip header".to_string());
        }
        return None;
    }

    match entry.kind() {
        AssetKind::Json => serde_json::from_slice::<serde_json::Value>(bytes)
            .err()
            .map(|e| format!("invalid JSON: {}", e)),
        AssetKind::Version => std::str::from_utf8(bytes)
            .err()
            .map(|_| "version is not valid UTF-8".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DEFAULT_NAME;
    use anyhow::anyhow;

    struct MapSource(HashMap<&'static str, Vec<u8>>);

    impl AssetSource for MapSource {
        fn name(&self) -> &str {
            "test"
        }

        fn exists(&self, path: &str) -> bool {
            self.0.contains_key(path)
        }

        fn read(&self, path: &str) -> anyhow::Result<Vec<u8>> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow!("no such file: {}", path))
        }
    }

    fn gz(payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0x1f, 0x8b, 0x08, 0x00];
        bytes.extend_from_slice(payload);
        bytes
    }

    fn manifest() -> Manifest {
        Manifest::new(
            DEFAULT_NAME,
            vec![
                AssetEntry::new("VERSION", "VERSION"),
                AssetEntry::new("index_js", "assets/index.js.gz"),
                AssetEntry::new("pinconfig", "config/pinconfig.json"),
                AssetEntry::new("favicon", "icons/favicon.ico"),
            ],
        )
    }

    fn full_source() -> MapSource {
        MapSource(HashMap::from([
            ("VERSION", b"V5.0.1-42\n".to_vec()),
            ("assets/index.js.gz", gz(b"js")),
            ("config/pinconfig.json", br#"{"pins": []}"#.to_vec()),
            ("icons/favicon.ico", vec![0, 0, 1, 0]),
        ]))
    }

    #[test]
    fn test_load_complete_source() {
        let registry = AssetRegistry::load(manifest(), &full_source()).unwrap();

        assert_eq!(registry.len(), 4);
        assert!(registry.missing().is_empty());
        assert!(registry.warnings().is_empty(), "{:?}", registry.warnings());
        assert_eq!(registry.version().as_deref(), Some("V5.0.1-42"));
        assert_eq!(registry.get("favicon").unwrap().bytes(), &[0, 0, 1, 0]);
        assert_eq!(
            registry.get_by_path("assets/index.js.gz").unwrap().entry.symbol,
            "index_js"
        );
        assert_eq!(registry.total_bytes(), 10 + 6 + 12 + 4);
    }

    #[test]
    fn test_load_records_missing_files() {
        let mut source = full_source();
        source.0.remove("assets/index.js.gz");

        let registry = AssetRegistry::load(manifest(), &source).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.missing(), &["index_js".to_string()]);
        assert!(registry.get("index_js").is_none());

        let summary = registry.summary();
        assert_eq!(summary.entries, 4);
        assert_eq!(summary.loaded, 3);
        assert_eq!(summary.source, "test");
    }

    #[test]
    fn test_load_rejects_invalid_manifest() {
        let broken = Manifest::new(
            DEFAULT_NAME,
            vec![
                AssetEntry::new("a", "a.js.gz"),
                AssetEntry::new("a", "b.js.gz"),
            ],
        );
        let err = AssetRegistry::load(broken, &full_source()).unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateSymbol { row: 2, .. }));
    }

    #[test]
    fn test_content_warnings() {
        let mut source = full_source();
        source.0.insert("assets/index.js.gz", b"plain text".to_vec());
        source.0.insert("config/pinconfig.json", b"{not json".to_vec());

        let registry = AssetRegistry::load(manifest(), &source).unwrap();
        assert_eq!(registry.len(), 4, "warnings never drop an asset");
        assert_eq!(registry.warnings().len(), 2);
        assert!(registry.warnings()[0].starts_with("index_js: missing gzip header"));
        assert!(registry.warnings()[1].starts_with("pinconfig: invalid JSON"));
    }

    #[test]
    fn test_non_utf8_version_warns_but_loads() {
        let mut source = full_source();
        source.0.insert("VERSION", vec![0xff, 0xfe]);

        let registry = AssetRegistry::load(manifest(), &source).unwrap();
        assert_eq!(registry.len(), 4);
        assert!(registry.missing().is_empty());
        assert_eq!(
            registry.warnings(),
            &["VERSION: version is not valid UTF-8".to_string()]
        );
        assert_eq!(registry.get("VERSION").unwrap().bytes(), &[0xff, 0xfe]);
        assert_eq!(registry.version(), None);
    }

    #[test]
    fn test_blank_version_is_none() {
        let mut source = full_source();
        source.0.insert("VERSION", b"  \n".to_vec());
        let registry = AssetRegistry::load(manifest(), &source).unwrap();
        assert_eq!(registry.version(), None);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = LoadedAsset::new(AssetEntry::new("a", "a"), b"one".to_vec());
        let b = LoadedAsset::new(AssetEntry::new("b", "b"), b"one".to_vec());
        let c = LoadedAsset::new(AssetEntry::new("c", "c"), b"two".to_vec());
        assert_eq!(a.fingerprint().len(), 16);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
