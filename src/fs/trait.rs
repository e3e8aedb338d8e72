//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Abstraction over file system operations for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    ///
    /// Returns an error when existence cannot be determined (e.g. permission
    /// denied on a parent directory); a missing path is `Ok(false)`.
    fn try_exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Expand a glob pattern into matching paths, sorted
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}
