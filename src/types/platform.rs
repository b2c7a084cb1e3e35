//! Platform and credential-location types
//!
//! Produced once by the environment detector and consumed read-only by the
//! credential store reader.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Host platform classification, fixed for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Native Linux
    Linux,
    /// Native Windows
    Windows,
    /// Linux running inside Windows (WSL); the browser lives on the Windows host
    Wsl,
}

impl Platform {
    /// Whether browser stores live on another OS reached through a mount
    pub fn is_compat_layer(&self) -> bool {
        matches!(self, Self::Wsl)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Wsl => "wsl",
        };
        f.write_str(name)
    }
}

/// Supported browsers, in default preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
}

impl Browser {
    /// All supported browsers in default preference order
    pub const ALL: [Browser; 3] = [Browser::Chrome, Browser::Firefox, Browser::Edge];

    /// Lower-case identifier used in configuration and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
        }
    }

    /// Whether this browser keeps cookies in a Chromium `Cookies` database
    pub fn is_chromium(&self) -> bool {
        matches!(self, Self::Chrome | Self::Edge)
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chrome => "Chrome",
            Self::Firefox => "Firefox",
            Self::Edge => "Edge",
        };
        f.write_str(name)
    }
}

impl FromStr for Browser {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            "edge" => Ok(Self::Edge),
            other => Err(crate::Error::config(format!("Unsupported browser: {}", other))),
        }
    }
}

/// Layout of a credential location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// A single cookie database file
    File,
    /// A directory whose sub-directories are browser profiles
    ProfileDirectory,
}

/// One candidate place to look for browser cookies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialLocation {
    /// Browser owning the store
    pub browser: Browser,
    /// Absolute path of the file or profiles directory
    pub path: PathBuf,
    /// Layout of the location
    pub kind: LocationKind,
}

impl CredentialLocation {
    /// Create a single-file location
    pub fn file(browser: Browser, path: impl Into<PathBuf>) -> Self {
        Self {
            browser,
            path: path.into(),
            kind: LocationKind::File,
        }
    }

    /// Create a directory-of-profiles location
    pub fn profiles(browser: Browser, path: impl Into<PathBuf>) -> Self {
        Self {
            browser,
            path: path.into(),
            kind: LocationKind::ProfileDirectory,
        }
    }
}
