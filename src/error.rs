use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a wrapped invocation.
///
/// Every variant is fatal: the wrapper logs it and exits with status 1.
#[derive(Debug, Error)]
pub enum MixpathError {
    /// A manifest matched the glob but could not be read
    #[error("Failed to read manifest {path:?}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    /// The manifest glob could not be built or expanded
    #[error("Invalid manifest pattern '{pattern}': {reason}")]
    ManifestPattern { pattern: String, reason: String },

    /// The umbrella marker could not be inspected
    #[error("Failed to inspect umbrella marker {path:?}: {reason}")]
    Marker { path: PathBuf, reason: String },

    /// The wrapped tool could not be started
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A manifest reader task panicked or was cancelled
    #[error("Manifest reader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, MixpathError>;
