//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory name under the user configuration directory
pub const CONFIG_DIR_NAME: &str = "mubi-session";

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Load configuration with precedence order:
    /// 1. Command line arguments (applied by the caller, highest priority)
    /// 2. Environment variables
    /// 3. Configuration file
    /// 4. Default values (lowest priority)
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(crate::Error::Config(format!(
                        "Configuration file not found: {:?}",
                        path
                    )));
                }
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            }
            None => {
                if let Some(path) = default_config_path().filter(|p| p.exists()) {
                    info!("Loading configuration from file: {:?}", path);
                    settings = Settings::from_file(&path)?;
                } else {
                    debug!("No configuration file, using defaults");
                }
            }
        }

        // Override with environment variables
        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        // Validate final configuration
        settings.validate()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:?}", settings);

        Ok(settings)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `<user config dir>/mubi-session/config.toml`, when a config dir exists
pub fn default_config_path() -> Option<PathBuf> {
    match dirs::config_dir() {
        Some(dir) => Some(dir.join(CONFIG_DIR_NAME).join("config.toml")),
        None => {
            warn!("No user configuration directory on this platform");
            None
        }
    }
}
