use crate::error::{MixpathError, Result};
use crate::fs::FileSystem;
use std::path::Path;
use tracing::debug;

/// How the wrapped tool's output is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Output streams through untouched
    Passthrough,
    /// Output is captured in full and rewritten against the app dictionary
    Umbrella,
}

/// Umbrella mode iff the apps directory exists. Any stat failure other than
/// "not found" is fatal.
pub fn select_mode(fs: &dyn FileSystem, apps_dir: &Path) -> Result<Mode> {
    let exists = fs
        .try_exists(apps_dir)
        .map_err(|e| MixpathError::Marker {
            path: apps_dir.to_path_buf(),
            reason: format!("{:#}", e),
        })?;

    let mode = if exists {
        Mode::Umbrella
    } else {
        Mode::Passthrough
    };
    debug!(apps_dir = %apps_dir.display(), ?mode, "Selected mode");

    Ok(mode)
}
