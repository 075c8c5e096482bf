//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Archive folder for an account under `base_dir`.
pub fn account_folder_in(base_dir: &Path, handle: &str) -> Result<PathBuf> {
    let folder = sanitize_path_component(handle)?;
    Ok(base_dir.join(folder))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
