//! Scan of candidate credential locations

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::firefox::{FirefoxCookieDb, profile_databases};
use super::{CookieStore, store_for};
use crate::config::settings::StoreSettings;
use crate::types::{Browser, CredentialLocation, LocationKind, RawCookieSet};
use crate::{Error, Result};

/// Non-fatal problem with one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreDiagnostic {
    pub browser: Browser,
    pub path: PathBuf,
    pub reason: String,
}

/// A usable cookie set and where it came from
#[derive(Debug, Clone)]
pub struct FoundCookies {
    pub browser: Browser,
    pub path: PathBuf,
    pub cookies: RawCookieSet,
}

/// Result of scanning candidate locations
#[derive(Debug, Default)]
pub struct ReadOutcome {
    /// First usable cookie set, in candidate order
    pub found: Option<FoundCookies>,
    pub diagnostics: Vec<StoreDiagnostic>,
    /// Number of locations attempted
    pub scanned: usize,
}

impl ReadOutcome {
    /// The usable cookie set, or the error explaining why there is none
    pub fn into_found(self) -> Result<FoundCookies> {
        if self.scanned == 0 {
            return Err(Error::NoCandidateLocations);
        }
        self.found.ok_or(Error::NoUsableCookies {
            scanned: self.scanned,
        })
    }
}

type ScanFn = fn(&CredentialLocation) -> LocationScan;

/// Reads cookies from candidate locations, first usable set wins
#[derive(Debug, Clone)]
pub struct CredentialStoreReader {
    read_timeout: Duration,
    scan: ScanFn,
}

impl CredentialStoreReader {
    pub fn new(read_timeout: Duration) -> Self {
        Self {
            read_timeout,
            scan: scan_location,
        }
    }

    #[cfg(test)]
    fn with_scan(read_timeout: Duration, scan: ScanFn) -> Self {
        Self { read_timeout, scan }
    }

    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.read_timeout())
    }

    /// Scan `candidates` in order
    ///
    /// Each location is read on the blocking pool under the per-location
    /// timeout. Failures become diagnostics and the scan moves on. Cookies
    /// from different locations are never merged.
    pub async fn read(&self, candidates: &[CredentialLocation]) -> ReadOutcome {
        let mut outcome = ReadOutcome::default();

        for location in candidates {
            outcome.scanned += 1;
            let owned = location.clone();
            let scan_fn = self.scan;
            let task = tokio::task::spawn_blocking(move || scan_fn(&owned));

            let scan = match tokio::time::timeout(self.read_timeout, task).await {
                Ok(Ok(scan)) => scan,
                Ok(Err(e)) => LocationScan::failed(location, format!("read task failed: {}", e)),
                Err(_) => LocationScan::failed(
                    location,
                    format!("timed out after {:?}", self.read_timeout),
                ),
            };

            for diagnostic in &scan.diagnostics {
                warn!(
                    browser = %diagnostic.browser,
                    path = ?diagnostic.path,
                    reason = %diagnostic.reason,
                    "Credential store skipped"
                );
            }
            outcome.diagnostics.extend(scan.diagnostics);

            if let Some(found) = scan.found {
                info!(browser = %found.browser, path = ?found.path, "Found MUBI cookies");
                outcome.found = Some(found);
                break;
            }
        }

        if outcome.found.is_none() {
            debug!(scanned = outcome.scanned, "No usable MUBI cookies in any location");
        }
        outcome
    }
}

#[derive(Debug, Default)]
struct LocationScan {
    found: Option<FoundCookies>,
    diagnostics: Vec<StoreDiagnostic>,
}

impl LocationScan {
    fn failed(location: &CredentialLocation, reason: String) -> Self {
        Self {
            found: None,
            diagnostics: vec![StoreDiagnostic {
                browser: location.browser,
                path: location.path.clone(),
                reason,
            }],
        }
    }

    fn note(&mut self, browser: Browser, path: &Path, reason: impl Into<String>) {
        self.diagnostics.push(StoreDiagnostic {
            browser,
            path: path.to_path_buf(),
            reason: reason.into(),
        });
    }
}

fn scan_location(location: &CredentialLocation) -> LocationScan {
    let browser = location.browser;
    let mut scan = LocationScan::default();

    let files = match location.kind {
        LocationKind::File => vec![location.path.clone()],
        LocationKind::ProfileDirectory => match profile_databases(&location.path) {
            Ok(files) if files.is_empty() => {
                scan.note(browser, &location.path, "no profiles with a cookie database");
                return scan;
            }
            Ok(files) => files,
            Err(e) => {
                scan.note(browser, &location.path, format!("cannot list profiles: {}", e));
                return scan;
            }
        },
    };
    let store: Box<dyn CookieStore> = match location.kind {
        LocationKind::File => store_for(location),
        LocationKind::ProfileDirectory => Box::new(FirefoxCookieDb),
    };

    for path in files {
        if let Err(e) = std::fs::File::open(&path) {
            scan.note(browser, &path, format!("not readable: {}", e));
            continue;
        }

        match store.read(browser, &path) {
            Ok(cookies) if cookies.is_usable() => {
                scan.found = Some(FoundCookies {
                    browser,
                    path,
                    cookies,
                });
                return scan;
            }
            Ok(cookies) if cookies.is_empty() => {
                debug!(%browser, ?path, "No MUBI cookies in store");
            }
            Ok(cookies) => {
                let names: Vec<&str> = cookies.names().collect();
                scan.note(
                    browser,
                    &path,
                    format!("required cookie pair incomplete (have {})", names.join(", ")),
                );
            }
            Err(Error::StoreRead { reason, .. }) => scan.note(browser, &path, reason),
            Err(e) => scan.note(browser, &path, e.to_string()),
        }
    }
    scan
}
