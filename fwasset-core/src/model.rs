//! Asset manifest data model
//!
//! An asset entry is a `(SYMBOL, "relative/path")` pair. Everything else
//! (encoding, kind, content type) is derived from the path.
//!
//! Path conventions:
//! - Paths are relative to the asset root and use `/` as separator
//! - A trailing `.gz` marks a gzip-compressed asset; the rest of the path
//!   is its *logical* path (`assets/index.js.gz` -> `assets/index.js`)
//! - A root-level file named `VERSION` holds the version string

use serde::{Deserialize, Serialize};
use std::fmt;

const GZIP_SUFFIX: &str = ".gz";
const VERSION_FILE: &str = "VERSION";

/// One row of the asset manifest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Symbolic identifier, unique within a manifest
    pub symbol: String,

    /// Path relative to the asset root
    pub path: String,
}

/// Transfer encoding of the stored bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Identity,
    Gzip,
}

/// Kind of asset, derived from the logical path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Html,
    Css,
    #[serde(rename = "javascript")]
    JavaScript,
    Svg,
    Json,
    Icon,
    Png,
    Version,
    Other,
}

impl AssetKind {
    /// MIME type for this kind of asset
    pub fn content_type(&self) -> &'static str {
        match self {
            AssetKind::Html => "text/html; charset=utf-8",
            AssetKind::Css => "text/css",
            AssetKind::JavaScript => "application/javascript",
            AssetKind::Svg => "image/svg+xml",
            AssetKind::Json => "application/json",
            AssetKind::Icon => "image/x-icon",
            AssetKind::Png => "image/png",
            AssetKind::Version => "text/plain; charset=utf-8",
            AssetKind::Other => "application/octet-stream",
        }
    }

    fn from_logical_path(path: &str) -> Self {
        let name = file_name_of(path);
        if path == VERSION_FILE {
            return AssetKind::Version;
        }
        let ext = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => return AssetKind::Other,
        };
        match ext.as_str() {
            "html" | "htm" => AssetKind::Html,
            "css" => AssetKind::Css,
            "js" | "mjs" => AssetKind::JavaScript,
            "svg" => AssetKind::Svg,
            "json" => AssetKind::Json,
            "ico" => AssetKind::Icon,
            "png" => AssetKind::Png,
            _ => AssetKind::Other,
        }
    }
}

impl AssetEntry {
    pub fn new(symbol: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            path: path.into(),
        }
    }

    /// Build an entry whose symbol follows the manifest naming convention
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            symbol: derive_symbol(&path),
            path,
        }
    }

    pub fn encoding(&self) -> Encoding {
        if self.is_compressed() {
            Encoding::Gzip
        } else {
            Encoding::Identity
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.path.len() > GZIP_SUFFIX.len() && self.path.ends_with(GZIP_SUFFIX)
    }

    /// Path with any `.gz` suffix removed
    pub fn logical_path(&self) -> &str {
        if self.is_compressed() {
            &self.path[..self.path.len() - GZIP_SUFFIX.len()]
        } else {
            &self.path
        }
    }

    pub fn kind(&self) -> AssetKind {
        AssetKind::from_logical_path(self.logical_path())
    }

    pub fn content_type(&self) -> &'static str {
        self.kind().content_type()
    }

    /// First directory segment (`assets`, `icons`, `config`), `None` for
    /// files at the asset root
    pub fn group(&self) -> Option<&str> {
        self.path.split_once('/').map(|(group, _)| group)
    }

    pub fn file_name(&self) -> &str {
        file_name_of(&self.path)
    }
}

impl fmt::Display for AssetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.path)
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Derive the symbol for an asset path.
///
/// Compressed files keep their inner extension (`index.js.gz` -> `index_js`),
/// plain files drop theirs (`favicon.ico` -> `favicon`). Characters that are
/// not valid in an identifier become `_`, and a leading digit gets a `_`
/// prefix.
pub fn derive_symbol(path: &str) -> String {
    let compressed = path.len() > GZIP_SUFFIX.len() && path.ends_with(GZIP_SUFFIX);
    let logical = if compressed {
        &path[..path.len() - GZIP_SUFFIX.len()]
    } else {
        path
    };
    let name = file_name_of(logical);

    let base = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && compressed => format!("{stem}_{ext}"),
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    };

    let mut symbol: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if symbol.is_empty() || symbol.starts_with(|c: char| c.is_ascii_digit()) {
        symbol.insert(0, '_');
    }
    symbol
}

/// C identifier syntax, so every symbol expands to a valid binding
pub fn is_valid_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Why a manifest path is not well formed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathProblem {
    #[error("path is empty")]
    Empty,
    #[error("path has leading or trailing whitespace")]
    SurroundingWhitespace,
    #[error("path is absolute")]
    Absolute,
    #[error("path contains a backslash")]
    Backslash,
    #[error("path contains a quote or control character")]
    ForbiddenCharacter,
    #[error("path contains an empty segment")]
    EmptySegment,
    #[error("path contains a '.' or '..' segment")]
    DotSegment,
    #[error("path ends with '/'")]
    TrailingSlash,
}

/// Check that a path is a well-formed relative path
pub fn check_path(path: &str) -> Result<(), PathProblem> {
    if path.is_empty() {
        return Err(PathProblem::Empty);
    }
    if path.trim() != path {
        return Err(PathProblem::SurroundingWhitespace);
    }
    if path.starts_with('/') || has_drive_prefix(path) {
        return Err(PathProblem::Absolute);
    }
    if path.contains('\\') {
        return Err(PathProblem::Backslash);
    }
    if path.chars().any(|c| c == '"' || c.is_control()) {
        return Err(PathProblem::ForbiddenCharacter);
    }
    if path.ends_with('/') {
        return Err(PathProblem::TrailingSlash);
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err(PathProblem::EmptySegment),
            "." | ".." => return Err(PathProblem::DotSegment),
            _ => {}
        }
    }
    Ok(())
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_symbol_matches_shipped_names() {
        assert_eq!(derive_symbol("VERSION"), "VERSION");
        assert_eq!(derive_symbol("assets/RgbwwLayout.css.gz"), "RgbwwLayout_css");
        assert_eq!(derive_symbol("assets/index.js.gz"), "index_js");
        assert_eq!(derive_symbol("config/pinconfig.json"), "pinconfig");
        assert_eq!(derive_symbol("icons/favicon.ico"), "favicon");
        assert_eq!(derive_symbol("index.html.gz"), "index_html");
        assert_eq!(
            derive_symbol("icons/visibility-outlined-24.svg.gz"),
            "visibility_outlined_24_svg"
        );
        assert_eq!(
            derive_symbol("icons/network_wifi_FILL0_wght400_GRAD0_opsz24.svg.gz"),
            "network_wifi_FILL0_wght400_GRAD0_opsz24_svg"
        );
    }

    #[test]
    fn test_derive_symbol_edge_cases() {
        // Bare .gz has no inner extension to keep
        assert_eq!(derive_symbol("data.gz"), "data");
        // Dot files keep their whole name
        assert_eq!(derive_symbol(".htaccess"), "_htaccess");
        assert_eq!(derive_symbol("icons/3d.svg.gz"), "_3d_svg");
        assert!(is_valid_symbol(&derive_symbol("weird name (1).png")));
    }

    #[test]
    fn test_is_valid_symbol() {
        assert!(is_valid_symbol("VERSION"));
        assert!(is_valid_symbol("_private"));
        assert!(is_valid_symbol("menu_outlined_24_svg"));
        assert!(!is_valid_symbol(""));
        assert!(!is_valid_symbol("24_menu"));
        assert!(!is_valid_symbol("index-js"));
        assert!(!is_valid_symbol("index js"));
    }

    #[test]
    fn test_check_path_accepts_manifest_paths() {
        assert_eq!(check_path("VERSION"), Ok(()));
        assert_eq!(check_path("assets/index.js.gz"), Ok(()));
        assert_eq!(check_path("icons/visibility-outlined-24.svg.gz"), Ok(()));
    }

    #[test]
    fn test_check_path_rejects_malformed_paths() {
        assert_eq!(check_path(""), Err(PathProblem::Empty));
        assert_eq!(check_path(" index.html"), Err(PathProblem::SurroundingWhitespace));
        assert_eq!(check_path("index.html\t"), Err(PathProblem::SurroundingWhitespace));
        assert_eq!(check_path("/etc/passwd"), Err(PathProblem::Absolute));
        assert_eq!(check_path("C:/assets/a.js"), Err(PathProblem::Absolute));
        assert_eq!(check_path("assets\\a.js"), Err(PathProblem::Backslash));
        assert_eq!(check_path("a\"b"), Err(PathProblem::ForbiddenCharacter));
        assert_eq!(check_path("assets//a.js"), Err(PathProblem::EmptySegment));
        assert_eq!(check_path("../secret"), Err(PathProblem::DotSegment));
        assert_eq!(check_path("assets/./a.js"), Err(PathProblem::DotSegment));
        assert_eq!(check_path("assets/"), Err(PathProblem::TrailingSlash));
    }

    #[test]
    fn test_entry_derived_properties() {
        let js = AssetEntry::new("index_js", "assets/index.js.gz");
        assert_eq!(js.encoding(), Encoding::Gzip);
        assert_eq!(js.logical_path(), "assets/index.js");
        assert_eq!(js.kind(), AssetKind::JavaScript);
        assert_eq!(js.content_type(), "application/javascript");
        assert_eq!(js.group(), Some("assets"));
        assert_eq!(js.file_name(), "index.js.gz");

        let favicon = AssetEntry::new("favicon", "icons/favicon.ico");
        assert_eq!(favicon.encoding(), Encoding::Identity);
        assert_eq!(favicon.kind(), AssetKind::Icon);

        let pinconfig = AssetEntry::new("pinconfig", "config/pinconfig.json");
        assert_eq!(pinconfig.kind(), AssetKind::Json);
        assert!(!pinconfig.is_compressed());

        let version = AssetEntry::new("VERSION", "VERSION");
        assert_eq!(version.kind(), AssetKind::Version);
        assert_eq!(version.group(), None);
    }

    #[test]
    fn test_entry_from_path() {
        let entry = AssetEntry::from_path("icons/api.svg.gz");
        assert_eq!(entry.symbol, "api_svg");
        assert_eq!(entry.kind(), AssetKind::Svg);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&AssetKind::JavaScript).unwrap();
        assert_eq!(json, "\"javascript\"");
        let json = serde_json::to_string(&Encoding::Gzip).unwrap();
        assert_eq!(json, "\"gzip\"");
    }
}
