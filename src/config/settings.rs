//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for session
//! authentication.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::types::Browser;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "MUBI_AUTH_";

/// Main configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cookie discovery and login configuration
    pub auth: AuthSettings,
    /// Credential store reading
    pub store: StoreSettings,
    /// Status validation and heartbeat
    pub validation: ValidationSettings,
    /// Interactive and manual fallback
    pub interactive: InteractiveSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Cookie discovery and login configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Browser preference order for discovery
    pub browsers: Vec<Browser>,
    /// Restrict discovery to one browser
    pub browser: Option<Browser>,
    /// Login page opened for interactive login
    pub login_url: String,
    /// Two-letter country code sent as `client-country`
    pub country: String,
}

/// Credential store reading
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Per-location read timeout in seconds
    pub read_timeout_secs: u64,
}

/// Status validation and heartbeat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Authenticated endpoint used for the status check
    pub status_url: String,
    /// Status call timeout in seconds
    pub timeout_secs: u64,
    /// Heartbeat interval in seconds
    pub heartbeat_interval_secs: u64,
    /// Consecutive inconclusive checks tolerated before fallback
    pub max_inconclusive: u32,
    /// Longest a header consumer waits on validation, in milliseconds
    pub header_timeout_millis: u64,
}

/// Whether an interactive display may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Detect from the environment
    Auto,
    /// Assume a display is available
    Always,
    /// Never launch a browser
    Never,
}

/// Interactive and manual fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveSettings {
    /// Display availability override
    pub display: DisplayMode,
    /// Prompt the operator at all (false for unattended runs)
    pub prompts_enabled: bool,
    /// Longest wait for the operator to finish logging in, in seconds
    pub login_wait_secs: u64,
    /// Pause after login so the browser flushes its cookie store, in milliseconds
    pub settle_delay_millis: u64,
    /// Manual entry attempts before giving up
    pub manual_attempts: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            browsers: Browser::ALL.to_vec(),
            browser: None,
            login_url: "https://mubi.com/login".to_string(),
            country: "US".to_string(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            read_timeout_secs: 10,
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            status_url: "https://api.mubi.com/v3/current_user".to_string(),
            timeout_secs: 10,
            heartbeat_interval_secs: 300,
            max_inconclusive: 3,
            header_timeout_millis: 3000,
        }
    }
}

impl Default for InteractiveSettings {
    fn default() -> Self {
        Self {
            display: DisplayMode::Auto,
            prompts_enabled: true,
            login_wait_secs: 300,
            settle_delay_millis: 2000,
            manual_attempts: 3,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auth: AuthSettings::default(),
            store: StoreSettings::default(),
            validation: ValidationSettings::default(),
            interactive: InteractiveSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl StoreSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl ValidationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn header_timeout(&self) -> Duration {
        Duration::from_millis(self.header_timeout_millis)
    }
}

impl InteractiveSettings {
    pub fn login_wait(&self) -> Duration {
        Duration::from_secs(self.login_wait_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_millis)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| crate::Error::Config(format!("Invalid config file {:?}: {}", path, e)))
    }

    /// Apply `MUBI_AUTH_*` environment overrides
    pub fn merge_with_env(self) -> crate::Result<Self> {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_with_vars<F>(mut self, lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(browser) = var("BROWSER") {
            self.auth.browser = Some(browser.parse()?);
        }

        if let Some(country) = var("COUNTRY") {
            self.auth.country = country.trim().to_ascii_uppercase();
        }

        if let Some(url) = var("STATUS_URL") {
            self.validation.status_url = url;
        }

        if let Some(secs) = var("HEARTBEAT_SECS") {
            self.validation.heartbeat_interval_secs = secs
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid heartbeat interval: {}", e)))?;
        }

        if let Some(mode) = var("DISPLAY") {
            self.interactive.display = match mode.trim().to_ascii_lowercase().as_str() {
                "auto" => DisplayMode::Auto,
                "always" => DisplayMode::Always,
                "never" => DisplayMode::Never,
                other => {
                    return Err(crate::Error::Config(format!("Invalid display mode: {}", other)));
                }
            };
        }

        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Reject settings the session components cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        for (name, raw) in [
            ("login_url", &self.auth.login_url),
            ("status_url", &self.validation.status_url),
        ] {
            let url = url::Url::parse(raw)
                .map_err(|e| crate::Error::Config(format!("Invalid {}: {}", name, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(crate::Error::Config(format!(
                    "{} must be http(s), got {}",
                    name,
                    url.scheme()
                )));
            }
        }

        if !is_country_code(&self.auth.country) {
            return Err(crate::Error::Config(format!(
                "auth.country must be a two-letter code, got {:?}",
                self.auth.country
            )));
        }

        if self.auth.browsers.is_empty() && self.auth.browser.is_none() {
            return Err(crate::Error::config("browser preference list is empty"));
        }

        let non_zero = [
            ("store.read_timeout_secs", self.store.read_timeout_secs),
            ("validation.timeout_secs", self.validation.timeout_secs),
            (
                "validation.heartbeat_interval_secs",
                self.validation.heartbeat_interval_secs,
            ),
            (
                "validation.header_timeout_millis",
                self.validation.header_timeout_millis,
            ),
            ("interactive.login_wait_secs", self.interactive.login_wait_secs),
        ];
        for (name, value) in non_zero {
            if value == 0 {
                return Err(crate::Error::Config(format!("{} must be greater than zero", name)));
            }
        }

        Ok(())
    }

    /// Browsers to scan, in order
    pub fn browser_order(&self) -> Vec<Browser> {
        match self.auth.browser {
            Some(browser) => vec![browser],
            None => self.auth.browsers.clone(),
        }
    }
}

/// Two ASCII letters, as sent in the `client-country` header
pub fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic())
}
