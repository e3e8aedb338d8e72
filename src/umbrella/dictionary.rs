//! App name to directory mapping for an umbrella project
//!
//! Each manifest is read on its own blocking task; nothing is inserted into
//! the dictionary until every task has joined, so callers only ever see the
//! complete mapping.

use crate::error::{MixpathError, Result};
use crate::fs::FileSystem;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

static APP_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"app:\s*:(\w+)").expect("app declaration pattern is valid"));

/// The app declared by one manifest and the directory holding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppResolution {
    pub name: String,
    /// Manifest directory, always ending in `/`
    pub path: String,
}

/// Read-only mapping from app name to its directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppDictionary {
    apps: HashMap<String, String>,
}

impl AppDictionary {
    /// Directory for `name`, or `""` if the app is unknown
    pub fn lookup(&self, name: &str) -> &str {
        self.apps.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.apps.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// Collects resolutions in discovery order; the first declaration of a name wins.
impl FromIterator<AppResolution> for AppDictionary {
    fn from_iter<I: IntoIterator<Item = AppResolution>>(iter: I) -> Self {
        let mut apps = HashMap::new();
        for resolution in iter {
            match apps.entry(resolution.name) {
                Entry::Occupied(existing) => {
                    warn!(
                        app = %existing.key(),
                        kept = %existing.get(),
                        ignored = %resolution.path,
                        "Duplicate app name, keeping first declaration"
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(resolution.path);
                }
            }
        }
        Self { apps }
    }
}

/// Extracts the `app: :name` declaration from manifest contents
pub fn extract_app_name(contents: &str) -> Option<&str> {
    APP_DECLARATION
        .captures(contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Directory of `manifest` with a trailing separator, `""` for a bare file name
fn manifest_dir(manifest: &Path) -> String {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            let mut dir = parent.to_string_lossy().into_owned();
            if !dir.ends_with('/') {
                dir.push('/');
            }
            dir
        }
        _ => String::new(),
    }
}

/// Reads one manifest. `Ok(None)` means the manifest declares no app.
pub fn resolve_manifest(fs: &dyn FileSystem, manifest: &Path) -> Result<Option<AppResolution>> {
    let contents = fs
        .read_to_string(manifest)
        .map_err(|e| MixpathError::ManifestRead {
            path: manifest.to_path_buf(),
            reason: format!("{:#}", e),
        })?;

    Ok(extract_app_name(&contents).map(|name| AppResolution {
        name: name.to_string(),
        path: manifest_dir(manifest),
    }))
}

/// Builds the dictionary from `manifests`, reading all of them concurrently.
///
/// Fails on the first unreadable manifest. Manifests without a declaration
/// are skipped.
pub async fn build_app_dictionary(
    fs: Arc<dyn FileSystem>,
    manifests: Vec<PathBuf>,
) -> Result<AppDictionary> {
    let mut tasks = JoinSet::new();

    for (index, manifest) in manifests.iter().cloned().enumerate() {
        let fs = Arc::clone(&fs);
        tasks.spawn_blocking(move || (index, resolve_manifest(fs.as_ref(), &manifest)));
    }

    let mut slots: Vec<Option<AppResolution>> = vec![None; manifests.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, resolved) = joined?;
        match resolved? {
            Some(resolution) => {
                debug!(app = %resolution.name, dir = %resolution.path, "Resolved app");
                slots[index] = Some(resolution);
            }
            None => {
                warn!(
                    manifest = %manifests[index].display(),
                    "Manifest has no app declaration, skipping"
                );
            }
        }
    }

    let dictionary: AppDictionary = slots.into_iter().flatten().collect();
    debug!(apps = dictionary.len(), "Built app dictionary");

    Ok(dictionary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use std::time::Duration;

    const WEB_MIX: &str = r#"defmodule Web.MixProject do
  use Mix.Project

  def project do
    [
      app: :web,
      version: "0.1.0",
      build_path: "../../_build",
      deps: deps()
    ]
  end
end
"#;

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_extract_app_name() {
        assert_eq!(extract_app_name(WEB_MIX), Some("web"));
        assert_eq!(extract_app_name("app: :my_app_2"), Some("my_app_2"));
        assert_eq!(extract_app_name("app:  :spaced"), Some("spaced"));
        assert_eq!(extract_app_name("[version: \"1.0\"]"), None);
    }

    #[test]
    fn test_manifest_dir() {
        assert_eq!(manifest_dir(Path::new("apps/web/mix.exs")), "apps/web/");
        assert_eq!(manifest_dir(Path::new("/abs/apps/web/mix.exs")), "/abs/apps/web/");
        assert_eq!(manifest_dir(Path::new("mix.exs")), "");
    }

    #[test]
    fn test_lookup_unknown_is_empty() {
        let dictionary = AppDictionary::default();
        assert_eq!(dictionary.lookup("missing"), "");
        assert!(!dictionary.contains("missing"));
    }

    #[test]
    fn test_first_declaration_wins() {
        let dictionary: AppDictionary = vec![
            AppResolution {
                name: "shared".to_string(),
                path: "apps/a/".to_string(),
            },
            AppResolution {
                name: "shared".to_string(),
                path: "apps/b/".to_string(),
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.lookup("shared"), "apps/a/");
    }

    #[tokio::test]
    async fn test_build_dictionary_complete() {
        let fs = MockFileSystem::new();
        fs.add_file("apps/web/mix.exs", WEB_MIX);
        fs.add_file("apps/core/mix.exs", "app: :core");
        fs.add_file("apps/billing/mix.exs", "app: :billing_engine");

        let dictionary = build_app_dictionary(
            Arc::new(fs),
            paths(&["apps/billing/mix.exs", "apps/core/mix.exs", "apps/web/mix.exs"]),
        )
        .await
        .unwrap();

        assert_eq!(dictionary.len(), 3);
        assert_eq!(dictionary.lookup("web"), "apps/web/");
        assert_eq!(dictionary.lookup("core"), "apps/core/");
        assert_eq!(dictionary.lookup("billing_engine"), "apps/billing/");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_build_dictionary_independent_of_completion_order() {
        let fs = MockFileSystem::new();
        fs.add_slow_file("apps/a/mix.exs", "app: :dup", Duration::from_millis(80));
        fs.add_slow_file("apps/b/mix.exs", "app: :dup", Duration::from_millis(1));
        fs.add_slow_file("apps/c/mix.exs", "app: :other", Duration::from_millis(40));

        let dictionary = build_app_dictionary(
            Arc::new(fs),
            paths(&["apps/a/mix.exs", "apps/b/mix.exs", "apps/c/mix.exs"]),
        )
        .await
        .unwrap();

        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.lookup("dup"), "apps/a/");
        assert_eq!(dictionary.lookup("other"), "apps/c/");
    }

    #[tokio::test]
    async fn test_build_dictionary_skips_undeclared() {
        let fs = MockFileSystem::new();
        fs.add_file("apps/web/mix.exs", "app: :web");
        fs.add_file("apps/scratch/mix.exs", "# nothing here");

        let dictionary = build_app_dictionary(
            Arc::new(fs),
            paths(&["apps/scratch/mix.exs", "apps/web/mix.exs"]),
        )
        .await
        .unwrap();

        assert_eq!(dictionary.len(), 1);
        assert!(!dictionary.contains(""));
    }

    #[tokio::test]
    async fn test_build_dictionary_unreadable_is_fatal() {
        let fs = MockFileSystem::new();
        fs.add_file("apps/web/mix.exs", "app: :web");
        fs.add_unreadable("apps/locked/mix.exs");

        let err = build_app_dictionary(
            Arc::new(fs),
            paths(&["apps/locked/mix.exs", "apps/web/mix.exs"]),
        )
        .await
        .unwrap_err();

        match err {
            MixpathError::ManifestRead { path, .. } => {
                assert_eq!(path, PathBuf::from("apps/locked/mix.exs"))
            }
            other => panic!("Expected ManifestRead, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_build_dictionary_no_manifests() {
        let dictionary = build_app_dictionary(Arc::new(MockFileSystem::new()), Vec::new())
            .await
            .unwrap();
        assert!(dictionary.is_empty());
    }
}
