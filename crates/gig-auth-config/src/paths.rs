//! File system paths used by the auth layer outside a browser.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Directory name under the user's home directory.
const BASE_DIR_NAME: &str = ".gig-auth";
/// Persistent key-value store used by file-backed storage.
const STORAGE_FILE_NAME: &str = "storage.json";

/// Manages file system paths for the auth layer.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.gig-auth)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.gig-auth`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.gig-auth/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the persistent storage file path (~/.gig-auth/storage.json).
    pub fn storage_file(&self) -> PathBuf {
        self.base_dir.join(STORAGE_FILE_NAME)
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}
