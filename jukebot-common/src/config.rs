//! Configuration file resolution and TOML loading
//!
//! Config file location follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config file (`~/.config/<app>/config.toml`)
//! 4. System config file (`/etc/<app>/config.toml`, Linux only)
//!
//! When none of these yield a file the caller falls back to built-in
//! defaults. A missing config file is never fatal.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file name looked up inside the per-application directories
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error, off)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolves which config file an application should read
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    app_name: String,
    env_var_name: String,
}

impl ConfigResolver {
    /// Create a resolver for `app_name`, honouring `env_var_name` as override
    pub fn new(app_name: impl Into<String>, env_var_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            env_var_name: env_var_name.into(),
        }
    }

    /// Resolve the config file path
    ///
    /// A path given on the command line or in the environment is returned
    /// as-is, even if it does not exist, so the caller can report it. The
    /// well-known locations are only returned when the file is present.
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            debug!("Using config file from command line: {}", path.display());
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.is_empty() {
                debug!("Using config file from {}: {}", self.env_var_name, path);
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3 and 4: well-known locations
        self.candidate_paths().into_iter().find(|path| path.exists())
    }

    /// Well-known config file locations, most specific first
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(&self.app_name).join(CONFIG_FILE_NAME));
        }

        if cfg!(target_os = "linux") {
            paths.push(
                PathBuf::from("/etc")
                    .join(&self.app_name)
                    .join(CONFIG_FILE_NAME),
            );
        }

        paths
    }
}

/// Read and deserialize a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    parse_toml(&content)
}

/// Deserialize a TOML document
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(toml::from_str(content)?)
}

/// Validate a log level string before handing it to a subscriber
pub fn validate_log_level(level: &str) -> Result<()> {
    match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
        other => Err(Error::Config(format!("Unknown log level: {}", other))),
    }
}
