//! Asset source trait definition

use anyhow::Result;

/// Where asset bytes come from
///
/// Paths are manifest paths: relative, `/`-separated, already validated by
/// the manifest. Implementations must not resolve anything outside their
/// own root.
pub trait AssetSource: Send + Sync {
    /// Get the name of this source (e.g., "dir:/srv/www", "memory")
    fn name(&self) -> &str;

    /// Check whether a file exists for this path
    ///
    /// This should be a lightweight check that does not read the file.
    fn exists(&self, path: &str) -> bool;

    /// Read the raw stored bytes for a path
    ///
    /// Compressed assets are returned as stored; nothing is decoded.
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}
