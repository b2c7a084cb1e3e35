//! Raw host signals the detector classifies
//!
//! Captured once from the running process; tests build them by hand.

use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variables the detector consults
pub const WATCHED_VARS: [&str; 6] = [
    "USER",
    "USERPROFILE",
    "LOCALAPPDATA",
    "APPDATA",
    "DISPLAY",
    "WAYLAND_DISPLAY",
];

/// OS-identifying inputs for platform classification
#[derive(Debug, Clone)]
pub struct HostSignals {
    /// `std::env::consts::OS` of the running binary
    pub os_family: String,
    /// Contents of `/proc/version`, when readable
    pub kernel_version: Option<String>,
    /// Values of [`WATCHED_VARS`] that are set
    pub vars: HashMap<String, String>,
    /// Current user's home directory
    pub home: Option<PathBuf>,
    /// Where host drives are mounted under a compatibility layer
    pub compat_mount_root: PathBuf,
}

impl HostSignals {
    /// Capture signals from the running process
    pub fn capture() -> Self {
        let vars = WATCHED_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();

        Self {
            os_family: std::env::consts::OS.to_string(),
            kernel_version: std::fs::read_to_string("/proc/version").ok(),
            vars,
            home: dirs::home_dir(),
            compat_mount_root: PathBuf::from("/mnt"),
        }
    }

    /// Look up a non-empty variable
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Whether the kernel identifies itself as running under WSL
    pub fn kernel_mentions_wsl(&self) -> bool {
        self.kernel_version
            .as_deref()
            .is_some_and(|v| v.to_ascii_lowercase().contains("microsoft"))
    }
}
