//! Asset sources for fwasset

pub mod dir;
pub mod memory;
pub mod scan;

pub use dir::DirSource;
pub use memory::MemorySource;
pub use scan::{scan_dir, ScanOptions};
