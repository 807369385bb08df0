//! Configuration for jukebot-player
//!
//! Bootstrap configuration loaded from TOML. Everything has a built-in
//! default, so running without a config file is fine.
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [queue]
//! max_songs_per_user = 3
//!
//! [[catalog.tracks]]
//! uri = "spotify:track:4uLU6hMCjMI75M1A2tKUQC"
//! artist = "Rick Astley"
//! title = "Never Gonna Give You Up"
//! duration_ms = 213573
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::session::CatalogTrack;
use jukebot_common::config::{load_toml, parse_toml, validate_log_level, ConfigResolver, LoggingConfig};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "JUKEBOT_CONFIG";

/// Directory name under the platform config dir
pub const APP_NAME: &str = "jukebot";

/// Player configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Queue policy
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct QueueConfig {
    /// Songs one requester may have waiting; 0 = unlimited
    #[serde(default)]
    pub max_songs_per_user: usize,
}

/// Tracks available to the built-in search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub tracks: Vec<CatalogTrack>,
}

impl PlayerConfig {
    /// Load configuration, falling back to defaults when no file is found
    ///
    /// An explicitly named file that cannot be read or parsed is an error.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let resolver = ConfigResolver::new(APP_NAME, CONFIG_ENV_VAR);

        let config = match resolver.resolve(cli_path) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                let config: Self = load_toml(&path).map_err(|e| {
                    Error::Config(format!("Failed to load {}: {}", path.display(), e))
                })?;
                config
            }
            None => {
                warn!("No configuration file found, using built-in defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the configured log level with a command-line override
    ///
    /// The override goes through the same check as the file value.
    pub fn override_log_level(&mut self, level: Option<&str>) -> Result<()> {
        if let Some(level) = level {
            validate_log_level(level)?;
            self.logging.level = level.to_string();
        }
        Ok(())
    }

    /// Check values a subscriber or the catalog would choke on
    pub fn validate(&self) -> Result<()> {
        validate_log_level(&self.logging.level)?;

        for track in &self.catalog.tracks {
            if track.duration_ms == 0 {
                return Err(Error::Config(format!(
                    "Catalog track {} has zero duration",
                    track.uri
                )));
            }
        }

        Ok(())
    }
}
