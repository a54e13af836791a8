//! Builtin web UI manifest
//!
//! `build.rs` expands `manifest/fileList.h` into the [`BuiltinAsset`] enum,
//! so the list compiled into the binary is always the shipped one.

use crate::manifest::Manifest;
use crate::model::AssetEntry;

include!(concat!(env!("OUT_DIR"), "/builtin_manifest.rs"));

/// Number of rows in the builtin manifest
pub const BUILTIN_COUNT: usize = BuiltinAsset::ALL.len();

/// The builtin manifest source text
pub const BUILTIN_SOURCE: &str = include_str!("../manifest/fileList.h");

impl BuiltinAsset {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.symbol() == symbol)
    }

    pub fn entry(self) -> AssetEntry {
        AssetEntry::new(self.symbol(), self.path())
    }
}

/// Manifest built from the compiled-in table
pub fn builtin_manifest() -> Manifest {
    Manifest::with_param(
        BUILTIN_NAME,
        BUILTIN_PARAM,
        BuiltinAsset::ALL.iter().map(|a| a.entry()).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{derive_symbol, AssetKind, Encoding};

    #[test]
    fn test_builtin_count() {
        assert_eq!(BUILTIN_COUNT, 54);
        assert_eq!(builtin_manifest().len(), BUILTIN_COUNT);
    }

    #[test]
    fn test_builtin_manifest_is_valid() {
        let report = builtin_manifest().check(Some(BUILTIN_COUNT));
        assert!(report.ok, "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn test_builtin_matches_source_text() {
        let parsed = Manifest::parse(BUILTIN_SOURCE).unwrap();
        assert_eq!(parsed, builtin_manifest());
        assert_eq!(builtin_manifest().render(), BUILTIN_SOURCE);
    }

    #[test]
    fn test_builtin_special_entries() {
        assert_eq!(BuiltinAsset::VERSION.path(), "VERSION");
        assert_eq!(BuiltinAsset::pinconfig.entry().kind(), AssetKind::Json);
        assert_eq!(BuiltinAsset::favicon.entry().encoding(), Encoding::Identity);
        assert_eq!(BuiltinAsset::index_html.path(), "index.html.gz");
        assert_eq!(BuiltinAsset::ALL[0], BuiltinAsset::VERSION);
    }

    #[test]
    fn test_only_three_uncompressed_entries() {
        let plain: Vec<&str> = BuiltinAsset::ALL
            .iter()
            .filter(|a| !a.entry().is_compressed())
            .map(|a| a.symbol())
            .collect();
        assert_eq!(plain, vec!["VERSION", "pinconfig", "favicon"]);
    }

    #[test]
    fn test_builtin_symbols_follow_naming_convention() {
        for asset in BuiltinAsset::ALL {
            assert_eq!(derive_symbol(asset.path()), asset.symbol(), "{}", asset.path());
        }
    }

    #[test]
    fn test_from_symbol() {
        assert_eq!(
            BuiltinAsset::from_symbol("visibility_outlined_24_svg"),
            Some(BuiltinAsset::visibility_outlined_24_svg)
        );
        assert_eq!(BuiltinAsset::from_symbol("nope"), None);
    }
}
