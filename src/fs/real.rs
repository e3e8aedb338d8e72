use super::FileSystem;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn try_exists(&self, path: &Path) -> Result<bool> {
        path.try_exists()
            .context(format!("Failed to stat {:?}", path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let entries =
            glob::glob(pattern).context(format!("Invalid glob pattern '{}'", pattern))?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                }
            }
        }
        paths.sort();

        Ok(paths)
    }
}
