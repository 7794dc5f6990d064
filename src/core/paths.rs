//! Local storage locations
//!
//! Everything the device persists lives under `ROOT/.receita/`.

use std::path::{Path, PathBuf};

/// Name of the device-local key-value file
pub const STORAGE_FILE: &str = "storage.json";

/// Get the .receita cache directory for a given root
pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(".receita")
}

/// Path of the key-value file inside a cache directory
pub fn storage_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(STORAGE_FILE)
}
