use crate::error::{MixpathError, Result};
use crate::fs::FileSystem;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finds the manifest of every app directly under the apps directory.
pub struct ManifestLocator<'a> {
    fs: &'a dyn FileSystem,
    apps_dir: &'a Path,
    manifest: &'a str,
}

impl<'a> ManifestLocator<'a> {
    pub fn new(fs: &'a dyn FileSystem, apps_dir: &'a Path, manifest: &'a str) -> Self {
        Self {
            fs,
            apps_dir,
            manifest,
        }
    }

    /// The `<apps_dir>/*/<manifest>` glob, with both literals escaped
    pub fn pattern(&self) -> String {
        let apps_dir = self.apps_dir.to_string_lossy();
        let apps_dir = apps_dir.trim_end_matches('/');
        format!(
            "{}/*/{}",
            Pattern::escape(apps_dir),
            Pattern::escape(self.manifest)
        )
    }

    /// Manifest paths in sorted order. This order is the discovery order used
    /// to settle duplicate app names.
    pub fn locate(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.pattern();
        let mut manifests =
            self.fs
                .glob(&pattern)
                .map_err(|e| MixpathError::ManifestPattern {
                    pattern: pattern.clone(),
                    reason: format!("{:#}", e),
                })?;
        manifests.sort();

        debug!(
            pattern = %pattern,
            count = manifests.len(),
            "Located app manifests"
        );

        Ok(manifests)
    }
}
