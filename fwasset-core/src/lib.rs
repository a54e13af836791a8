//! fwasset Core Library
//!
//! This crate provides the web asset manifest model, the X-macro manifest
//! format, the asset source trait and the load-time asset registry for
//! firmware images that embed a web UI.

pub mod builtin;
pub mod error;
pub mod manifest;
pub mod model;
pub mod registry;
pub mod source;

pub use builtin::{builtin_manifest, BuiltinAsset};
pub use error::ManifestError;
pub use manifest::{CheckReport, Manifest};
pub use model::AssetEntry;
pub use registry::AssetRegistry;
pub use source::AssetSource;
