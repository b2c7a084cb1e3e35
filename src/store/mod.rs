//! Credential store reading
//!
//! Every browser storage format sits behind [`CookieStore`]. The
//! [`CredentialStoreReader`] picks the implementation from each location's
//! browser and kind and scans candidates until one yields a usable cookie
//! pair.

pub mod chromium;
pub mod firefox;
pub mod netscape;
pub mod reader;
mod sqlite;

#[cfg(test)]
pub(crate) mod fixtures;

use std::path::Path;

use crate::Result;
use crate::types::{Browser, CredentialLocation, LocationKind, RawCookieSet};

pub use chromium::ChromiumCookieDb;
pub use firefox::FirefoxCookieDb;
pub use netscape::NetscapeCookieFile;
pub use reader::{CredentialStoreReader, FoundCookies, ReadOutcome, StoreDiagnostic};

/// On-disk cookie store formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    /// Chromium `Cookies` SQLite database
    ChromiumSqlite,
    /// Firefox `cookies.sqlite` database
    FirefoxSqlite,
    /// Netscape `cookies.txt` export
    NetscapeText,
}

/// One cookie storage format
///
/// Implementations return only cookies scoped to the target domain and never
/// modify the store.
pub trait CookieStore: Send + Sync {
    fn format(&self) -> StoreFormat;

    /// Read target-domain cookies from a single store file
    fn read(&self, browser: Browser, path: &Path) -> Result<RawCookieSet>;
}

/// Store implementation for a single-file location
pub fn store_for(location: &CredentialLocation) -> Box<dyn CookieStore> {
    match (location.kind, location.browser) {
        (LocationKind::File, browser) if browser.is_chromium() => Box::new(ChromiumCookieDb),
        _ => Box::new(FirefoxCookieDb),
    }
}
