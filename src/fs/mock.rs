use super::FileSystem;
use anyhow::{anyhow, Result};
use glob::{MatchOptions, Pattern};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        content: String,
        read_delay: Option<Duration>,
    },
    Unreadable,
    Directory,
}

/// In-memory file system keyed by the paths exactly as they were added.
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.insert(
            path.as_ref(),
            MockEntry::File {
                content: content.to_string(),
                read_delay: None,
            },
        );
    }

    /// Adds a file whose reads block for `delay`, to shuffle completion order.
    pub fn add_slow_file(&self, path: impl AsRef<Path>, content: &str, delay: Duration) {
        self.insert(
            path.as_ref(),
            MockEntry::File {
                content: content.to_string(),
                read_delay: Some(delay),
            },
        );
    }

    /// Adds a file that is listed by `glob` but fails on read.
    pub fn add_unreadable(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Unreadable);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, path);
        files.insert(path.to_path_buf(), MockEntry::Directory);
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        matches!(
            self.files.read().unwrap().get(path),
            Some(MockEntry::Directory)
        )
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut files = self.files.write().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }
        files.insert(path.to_path_buf(), entry);
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files
                .entry(current.clone())
                .or_insert(MockEntry::Directory);
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn try_exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.read().unwrap().contains_key(path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entry = self
            .files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        match entry {
            MockEntry::File {
                content,
                read_delay,
            } => {
                if let Some(delay) = read_delay {
                    std::thread::sleep(delay);
                }
                Ok(content)
            }
            MockEntry::Unreadable => Err(anyhow!("Permission denied: {:?}", path)),
            MockEntry::Directory => Err(anyhow!("Not a file: {:?}", path)),
        }
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern =
            Pattern::new(pattern).map_err(|e| anyhow!("Invalid glob pattern: {}", e))?;
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };

        let mut paths: Vec<PathBuf> = self
            .files
            .read()
            .unwrap()
            .keys()
            .filter(|path| pattern.matches_path_with(path, options))
            .cloned()
            .collect();
        paths.sort();

        Ok(paths)
    }
}
