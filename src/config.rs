//! Configuration management for mixpath
//!
//! The wrapper exposes no command-line flags of its own (every argument goes
//! to the wrapped tool), so all of its settings come from environment
//! variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `MIXPATH_TOOL`: Program to wrap - default: "mix"
//! - `MIXPATH_APPS_DIR`: Umbrella apps directory, also the umbrella marker - default: "apps"
//! - `MIXPATH_MANIFEST`: Manifest file name inside each app - default: "mix.exs"
//! - `MIXPATH_FILTER`: Rewrite stdin instead of running the tool (true|false) - default: "false"
//! - `MIXPATH_LOG_LEVEL`: Logging level - default: "warn"
//! - `MIXPATH_LOG_JSON`: Emit JSON log lines (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use mixpath::MixpathConfig;
//!
//! let config = MixpathConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("wrapping {}", config.tool);
//! ```

use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_TOOL: &str = "mix";
const DEFAULT_APPS_DIR: &str = "apps";
const DEFAULT_MANIFEST: &str = "mix.exs";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Main configuration structure for mixpath
///
/// `Default::default()` loads from `MIXPATH_*` environment variables and falls
/// back to defaults for anything unset. Malformed booleans are kept as parse
/// errors until [`MixpathConfig::validate`] so they are reported, not ignored.
#[derive(Debug, Clone)]
pub struct MixpathConfig {
    /// Program to run with the forwarded arguments
    pub tool: String,

    /// Apps directory; its existence selects umbrella mode
    pub apps_dir: PathBuf,

    /// Manifest file name looked up as `<apps_dir>/*/<manifest>`
    pub manifest: String,

    /// Rewrite stdin to stdout instead of running the tool
    pub filter: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines
    pub log_json: bool,

    parse_errors: Vec<ConfigError>,
}

impl Default for MixpathConfig {
    fn default() -> Self {
        let mut parse_errors = Vec::new();

        let tool = env::var("MIXPATH_TOOL").unwrap_or_else(|_| DEFAULT_TOOL.to_string());

        let apps_dir = env::var("MIXPATH_APPS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_APPS_DIR));

        let manifest =
            env::var("MIXPATH_MANIFEST").unwrap_or_else(|_| DEFAULT_MANIFEST.to_string());

        let filter = parse_bool_var("MIXPATH_FILTER", &mut parse_errors);

        let log_level = env::var("MIXPATH_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = parse_bool_var("MIXPATH_LOG_JSON", &mut parse_errors);

        Self {
            tool,
            apps_dir,
            manifest,
            filter,
            log_level,
            log_json,
            parse_errors,
        }
    }
}

fn parse_bool_var(name: &str, errors: &mut Vec<ConfigError>) -> bool {
    match env::var(name) {
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" | "" => false,
            other => {
                errors.push(ConfigError::ParseError {
                    field: name.to_string(),
                    error: format!("expected true or false, got '{}'", other),
                });
                false
            }
        },
        Err(_) => false,
    }
}

impl MixpathConfig {
    /// Configuration built from defaults only, ignoring the environment
    pub fn defaults() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            apps_dir: PathBuf::from(DEFAULT_APPS_DIR),
            manifest: DEFAULT_MANIFEST.to_string(),
            filter: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            parse_errors: Vec::new(),
        }
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns the first environment parse error, or `ValidationFailed` if a
    /// field is empty, the manifest name contains a path separator, or the log
    /// level is unknown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(err) = self.parse_errors.first() {
            return Err(err.clone());
        }

        if self.tool.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Tool to wrap must not be empty".to_string(),
            ));
        }

        if self.apps_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Apps directory must not be empty".to_string(),
            ));
        }

        if self.manifest.is_empty() || self.manifest.contains('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "Manifest must be a bare file name, got '{}'",
                self.manifest
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "MIXPATH_TOOL",
        "MIXPATH_APPS_DIR",
        "MIXPATH_MANIFEST",
        "MIXPATH_FILTER",
        "MIXPATH_LOG_LEVEL",
        "MIXPATH_LOG_JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_default_config() {
        clear_env();
        let config = MixpathConfig::default();

        assert_eq!(config.tool, "mix");
        assert_eq!(config.apps_dir, PathBuf::from("apps"));
        assert_eq!(config.manifest, "mix.exs");
        assert!(!config.filter);
        assert_eq!(config.log_level, "warn");
        assert!(!config.log_json);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        env::set_var("MIXPATH_TOOL", "/usr/local/bin/mix");
        env::set_var("MIXPATH_APPS_DIR", "umbrella/apps");
        env::set_var("MIXPATH_FILTER", "true");
        env::set_var("MIXPATH_LOG_LEVEL", "DEBUG");
        env::set_var("MIXPATH_LOG_JSON", "1");

        let config = MixpathConfig::default();
        clear_env();

        assert_eq!(config.tool, "/usr/local/bin/mix");
        assert_eq!(config.apps_dir, PathBuf::from("umbrella/apps"));
        assert!(config.filter);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_malformed_bool_is_reported() {
        clear_env();
        env::set_var("MIXPATH_FILTER", "sometimes");

        let config = MixpathConfig::default();
        clear_env();

        assert!(!config.filter);
        match config.validate() {
            Err(ConfigError::ParseError { field, .. }) => assert_eq!(field, "MIXPATH_FILTER"),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_empty_tool() {
        let mut config = MixpathConfig::defaults();
        config.tool = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_manifest_with_separator() {
        let mut config = MixpathConfig::defaults();
        config.manifest = "config/mix.exs".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bare file name"));
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = MixpathConfig::defaults();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
