//! Platform classification and candidate cookie-store locations
//!
//! Detection only performs read-only `stat`/`read_dir` calls. Missing paths
//! are dropped from the candidate list; an empty list is a valid result.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::signals::HostSignals;
use crate::types::{Browser, CredentialLocation, LocationKind, Platform};

/// Chromium profile directories probed on Windows hosts
const WINDOWS_CHROMIUM_PROFILES: [&str; 3] = ["Default", "Profile 1", "Profile 2"];
/// Chromium profile directories probed on Linux
const LINUX_CHROMIUM_PROFILES: [&str; 2] = ["Default", "Profile 1"];
/// Entries under the host `Users` directory that are not people
const SYSTEM_USER_DIRS: [&str; 6] = [
    "Public",
    "Default",
    "Default User",
    "All Users",
    "defaultuser0",
    "WsiAccount",
];

/// How the Windows user profile was located from inside a compatibility layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum HostProfile {
    /// Translated from `USERPROFILE`
    UserProfileVar { path: PathBuf },
    /// The only non-system directory under the host `Users` folder
    SoleUser { path: PathBuf },
    /// A host user directory named like the current user (heuristic)
    NameMatch { path: PathBuf },
    /// No mapping could be established
    Unresolved { reason: String },
}

impl HostProfile {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::UserProfileVar { path } | Self::SoleUser { path } | Self::NameMatch { path } => {
                Some(path)
            }
            Self::Unresolved { .. } => None,
        }
    }
}

/// Result of environment detection
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub platform: Platform,
    /// Existing locations, grouped by browser in the requested order
    pub candidates: Vec<CredentialLocation>,
    /// Whether a graphical session is available for interactive login
    pub display_available: bool,
    /// Host profile resolution, only under a compatibility layer
    pub host_profile: Option<HostProfile>,
}

/// Identifies the host platform and where its browsers keep cookies
#[derive(Debug, Clone)]
pub struct EnvironmentDetector {
    signals: HostSignals,
}

impl EnvironmentDetector {
    pub fn new(signals: HostSignals) -> Self {
        Self { signals }
    }

    /// Detector over the running process
    pub fn from_host() -> Self {
        Self::new(HostSignals::capture())
    }

    pub fn signals(&self) -> &HostSignals {
        &self.signals
    }

    /// Classify the platform from OS-identifying signals
    pub fn platform(&self) -> Platform {
        if self.signals.kernel_mentions_wsl() {
            Platform::Wsl
        } else if self.signals.os_family == "windows" {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Whether an interactive display is available
    pub fn display_available(&self) -> bool {
        match self.platform() {
            Platform::Windows => true,
            _ => self.signals.var("DISPLAY").is_some() || self.signals.var("WAYLAND_DISPLAY").is_some(),
        }
    }

    /// Detect the platform and the existing cookie-store candidates
    pub fn detect(&self, browsers: &[Browser]) -> Detection {
        let platform = self.platform();
        debug!(%platform, "Detected platform");

        let host_profile = platform
            .is_compat_layer()
            .then(|| self.resolve_host_profile());

        let mut candidates = Vec::new();
        for &browser in browsers {
            let proposed = self.proposed_locations(platform, browser, host_profile.as_ref());
            for location in proposed {
                let exists = location_exists(&location);
                debug!(browser = %browser, path = ?location.path, exists, "Checked candidate path");
                if exists && !candidates.contains(&location) {
                    candidates.push(location);
                }
            }
        }

        if candidates.is_empty() {
            warn!(%platform, "No browser cookie stores found");
        } else {
            info!(%platform, count = candidates.len(), "Found cookie store candidates");
        }

        Detection {
            platform,
            candidates,
            display_available: self.display_available(),
            host_profile,
        }
    }

    /// Every location the platform conventions suggest, existing or not
    fn proposed_locations(
        &self,
        platform: Platform,
        browser: Browser,
        host_profile: Option<&HostProfile>,
    ) -> Vec<CredentialLocation> {
        match platform {
            Platform::Windows => {
                let home = self.signals.home.clone().unwrap_or_default();
                let local = self
                    .signals
                    .var("LOCALAPPDATA")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| home.join("AppData").join("Local"));
                let roaming = self
                    .signals
                    .var("APPDATA")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| home.join("AppData").join("Roaming"));
                windows_locations(browser, &local, &roaming)
            }
            Platform::Wsl => {
                let mut locations = Vec::new();
                if let Some(host_home) = host_profile.and_then(HostProfile::path) {
                    let local = host_home.join("AppData").join("Local");
                    let roaming = host_home.join("AppData").join("Roaming");
                    locations.extend(windows_locations(browser, &local, &roaming));
                }
                // Browsers installed inside the Linux side of the layer
                if let Some(home) = &self.signals.home {
                    locations.extend(linux_locations(browser, home));
                }
                locations
            }
            Platform::Linux => match &self.signals.home {
                Some(home) => linux_locations(browser, home),
                None => Vec::new(),
            },
        }
    }

    /// Best-effort mapping from the compat layer to the host user profile
    pub fn resolve_host_profile(&self) -> HostProfile {
        let mount = &self.signals.compat_mount_root;

        if let Some(profile) = self.signals.var("USERPROFILE") {
            match translate_windows_path(profile, mount) {
                Some(path) if path.is_dir() => {
                    debug!(?path, "Host profile from USERPROFILE");
                    return HostProfile::UserProfileVar { path };
                }
                Some(path) => {
                    debug!(?path, "USERPROFILE translation does not exist");
                }
                None => debug!("USERPROFILE is not a drive path"),
            }
        }

        let users_root = mount.join("c").join("Users");
        let users: Vec<PathBuf> = match std::fs::read_dir(&users_root) {
            Ok(entries) => entries
                .flatten()
                .filter(|e| e.path().is_dir())
                .filter(|e| {
                    let name = e.file_name();
                    !SYSTEM_USER_DIRS
                        .iter()
                        .any(|s| name.to_string_lossy().eq_ignore_ascii_case(s))
                })
                .map(|e| e.path())
                .collect(),
            Err(e) => {
                let reason = format!("cannot list {}: {}", users_root.display(), e);
                warn!("Host profile unresolved: {}", reason);
                return HostProfile::Unresolved { reason };
            }
        };

        if let [only] = users.as_slice() {
            debug!(path = ?only, "Host profile from sole user directory");
            return HostProfile::SoleUser { path: only.clone() };
        }

        if let Some(user) = self.signals.var("USER") {
            let matched = users.iter().find(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(user))
            });
            if let Some(path) = matched {
                info!(?path, "Host profile guessed from matching user name");
                return HostProfile::NameMatch { path: path.clone() };
            }
        }

        let reason = format!(
            "{} host user directories under {}, none matching the current user",
            users.len(),
            users_root.display()
        );
        warn!("Host profile unresolved: {}", reason);
        HostProfile::Unresolved { reason }
    }
}

fn windows_locations(browser: Browser, local: &Path, roaming: &Path) -> Vec<CredentialLocation> {
    match browser {
        Browser::Chrome => chromium_files(
            browser,
            &local.join("Google").join("Chrome").join("User Data"),
            &WINDOWS_CHROMIUM_PROFILES,
        ),
        Browser::Edge => chromium_files(
            browser,
            &local.join("Microsoft").join("Edge").join("User Data"),
            &WINDOWS_CHROMIUM_PROFILES,
        ),
        Browser::Firefox => vec![CredentialLocation::profiles(
            browser,
            roaming.join("Mozilla").join("Firefox").join("Profiles"),
        )],
    }
}

fn linux_locations(browser: Browser, home: &Path) -> Vec<CredentialLocation> {
    let config = home.join(".config");
    match browser {
        Browser::Chrome => chromium_files(
            browser,
            &config.join("google-chrome"),
            &LINUX_CHROMIUM_PROFILES,
        ),
        Browser::Edge => chromium_files(
            browser,
            &config.join("microsoft-edge"),
            &LINUX_CHROMIUM_PROFILES,
        ),
        Browser::Firefox => vec![
            CredentialLocation::profiles(browser, home.join(".mozilla").join("firefox")),
            CredentialLocation::profiles(
                browser,
                home.join("snap")
                    .join("firefox")
                    .join("common")
                    .join(".mozilla")
                    .join("firefox"),
            ),
        ],
    }
}

/// `<root>/<profile>/Network/Cookies` (current layout) then `<root>/<profile>/Cookies`
fn chromium_files(browser: Browser, root: &Path, profiles: &[&str]) -> Vec<CredentialLocation> {
    profiles
        .iter()
        .flat_map(|profile| {
            let dir = root.join(profile);
            [
                CredentialLocation::file(browser, dir.join("Network").join("Cookies")),
                CredentialLocation::file(browser, dir.join("Cookies")),
            ]
        })
        .collect()
}

fn location_exists(location: &CredentialLocation) -> bool {
    match location.kind {
        LocationKind::File => location.path.is_file(),
        LocationKind::ProfileDirectory => location.path.is_dir(),
    }
}

/// Translate `C:\Users\x` into `<mount>/c/Users/x`
pub fn translate_windows_path(windows_path: &str, mount_root: &Path) -> Option<PathBuf> {
    let normalized = windows_path.trim().replace('\\', "/");
    let mut chars = normalized.chars();
    let drive = chars.next().filter(char::is_ascii_alphabetic)?;
    if chars.next() != Some(':') {
        return None;
    }
    let rest = chars.as_str().trim_start_matches('/');

    let mut path = mount_root.join(drive.to_ascii_lowercase().to_string());
    for segment in rest.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn signals(os: &str, kernel: Option<&str>, home: Option<&Path>, mount: &Path) -> HostSignals {
        HostSignals {
            os_family: os.to_string(),
            kernel_version: kernel.map(str::to_string),
            vars: HashMap::new(),
            home: home.map(Path::to_path_buf),
            compat_mount_root: mount.to_path_buf(),
        }
    }

    const WSL_KERNEL: &str = "Linux version 5.15.153.1-microsoft-standard-WSL2";

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_platform_classification() {
        let tmp = TempDir::new().unwrap();
        let d = EnvironmentDetector::new(signals("linux", Some(WSL_KERNEL), None, tmp.path()));
        assert_eq!(d.platform(), Platform::Wsl);

        let d = EnvironmentDetector::new(signals("windows", None, None, tmp.path()));
        assert_eq!(d.platform(), Platform::Windows);

        let d = EnvironmentDetector::new(signals("linux", Some("Linux version 6.8.0"), None, tmp.path()));
        assert_eq!(d.platform(), Platform::Linux);
    }

    #[test]
    fn test_linux_candidates_only_existing() {
        let home = TempDir::new().unwrap();
        let chrome = home.path().join(".config/google-chrome/Default/Network/Cookies");
        touch(&chrome);
        fs::create_dir_all(home.path().join(".mozilla/firefox")).unwrap();

        let d = EnvironmentDetector::new(signals("linux", None, Some(home.path()), home.path()));
        let detection = d.detect(&Browser::ALL);

        assert_eq!(detection.platform, Platform::Linux);
        assert_eq!(
            detection.candidates,
            vec![
                CredentialLocation::file(Browser::Chrome, chrome),
                CredentialLocation::profiles(Browser::Firefox, home.path().join(".mozilla/firefox")),
            ]
        );
        assert!(detection.host_profile.is_none());
    }

    #[test]
    fn test_empty_home_yields_no_candidates() {
        let home = TempDir::new().unwrap();
        let d = EnvironmentDetector::new(signals("linux", None, Some(home.path()), home.path()));
        let detection = d.detect(&Browser::ALL);
        assert!(detection.candidates.is_empty());
    }

    #[test]
    fn test_browser_order_respected() {
        let home = TempDir::new().unwrap();
        touch(&home.path().join(".config/microsoft-edge/Default/Cookies"));
        touch(&home.path().join(".config/google-chrome/Default/Cookies"));

        let d = EnvironmentDetector::new(signals("linux", None, Some(home.path()), home.path()));
        let detection = d.detect(&[Browser::Edge, Browser::Chrome]);
        let order: Vec<Browser> = detection.candidates.iter().map(|c| c.browser).collect();
        assert_eq!(order, vec![Browser::Edge, Browser::Chrome]);
    }

    #[test]
    fn test_windows_uses_appdata_vars() {
        let tmp = TempDir::new().unwrap();
        let local = tmp.path().join("Local");
        let roaming = tmp.path().join("Roaming");
        let cookies = local.join("Google/Chrome/User Data/Profile 1/Network/Cookies");
        touch(&cookies);
        fs::create_dir_all(roaming.join("Mozilla/Firefox/Profiles")).unwrap();

        let mut s = signals("windows", None, None, tmp.path());
        s.vars.insert("LOCALAPPDATA".into(), local.to_string_lossy().into_owned());
        s.vars.insert("APPDATA".into(), roaming.to_string_lossy().into_owned());

        let detection = EnvironmentDetector::new(s).detect(&Browser::ALL);
        assert_eq!(detection.platform, Platform::Windows);
        assert!(detection.display_available);
        assert_eq!(detection.candidates.len(), 2);
        assert_eq!(detection.candidates[0].path, cookies);
        assert_eq!(detection.candidates[1].kind, LocationKind::ProfileDirectory);
    }

    #[test]
    fn test_wsl_sole_user_profile() {
        let mount = TempDir::new().unwrap();
        let users = mount.path().join("c/Users");
        fs::create_dir_all(users.join("Public")).unwrap();
        fs::create_dir_all(users.join("Default")).unwrap();
        let host_cookies = users.join("Alice/AppData/Local/Microsoft/Edge/User Data/Default/Cookies");
        touch(&host_cookies);

        let d = EnvironmentDetector::new(signals("linux", Some(WSL_KERNEL), None, mount.path()));
        let detection = d.detect(&Browser::ALL);

        assert_eq!(detection.platform, Platform::Wsl);
        assert_eq!(
            detection.host_profile,
            Some(HostProfile::SoleUser {
                path: users.join("Alice")
            })
        );
        assert_eq!(detection.candidates, vec![CredentialLocation::file(Browser::Edge, host_cookies)]);
    }

    #[test]
    fn test_wsl_name_match_among_many() {
        let mount = TempDir::new().unwrap();
        let users = mount.path().join("c/Users");
        fs::create_dir_all(users.join("Alice")).unwrap();
        fs::create_dir_all(users.join("Bob")).unwrap();

        let mut s = signals("linux", Some(WSL_KERNEL), None, mount.path());
        s.vars.insert("USER".into(), "bob".into());
        let profile = EnvironmentDetector::new(s).resolve_host_profile();
        assert_eq!(profile, HostProfile::NameMatch { path: users.join("Bob") });
    }

    #[test]
    fn test_wsl_unresolved_is_explicit() {
        let mount = TempDir::new().unwrap();
        let users = mount.path().join("c/Users");
        fs::create_dir_all(users.join("Alice")).unwrap();
        fs::create_dir_all(users.join("Bob")).unwrap();

        let mut s = signals("linux", Some(WSL_KERNEL), None, mount.path());
        s.vars.insert("USER".into(), "carol".into());
        let detector = EnvironmentDetector::new(s);
        let profile = detector.resolve_host_profile();
        assert!(matches!(profile, HostProfile::Unresolved { .. }));

        let detection = detector.detect(&Browser::ALL);
        assert!(detection.candidates.is_empty());
    }

    #[test]
    fn test_wsl_userprofile_translation() {
        let mount = TempDir::new().unwrap();
        let target = mount.path().join("c/Users/Dana");
        fs::create_dir_all(&target).unwrap();

        let mut s = signals("linux", Some(WSL_KERNEL), None, mount.path());
        s.vars.insert("USERPROFILE".into(), r"C:\Users\Dana".into());
        let profile = EnvironmentDetector::new(s).resolve_host_profile();
        assert_eq!(profile, HostProfile::UserProfileVar { path: target });
    }

    #[test]
    fn test_translate_windows_path() {
        let mount = Path::new("/mnt");
        assert_eq!(
            translate_windows_path(r"C:\Users\Eve", mount),
            Some(PathBuf::from("/mnt/c/Users/Eve"))
        );
        assert_eq!(
            translate_windows_path("D:/Data/Profiles", mount),
            Some(PathBuf::from("/mnt/d/Data/Profiles"))
        );
        assert_eq!(translate_windows_path(r"\\server\share", mount), None);
        assert_eq!(translate_windows_path("", mount), None);
    }

    #[test]
    fn test_display_signal() {
        let tmp = TempDir::new().unwrap();
        let mut s = signals("linux", None, None, tmp.path());
        assert!(!EnvironmentDetector::new(s.clone()).display_available());

        s.vars.insert("WAYLAND_DISPLAY".into(), "wayland-0".into());
        assert!(EnvironmentDetector::new(s).display_available());
    }
}
