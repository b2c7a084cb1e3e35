//! Firefox `cookies.sqlite` database and profile enumeration

use std::path::{Path, PathBuf};
use tracing::debug;

use super::{CookieStore, StoreFormat, sqlite::with_readonly_db};
use crate::types::{Browser, RawCookieSet, cookies::host_matches};
use crate::Result;

/// Cookie database file inside a Firefox profile
pub const COOKIE_DB_NAME: &str = "cookies.sqlite";

const QUERY: &str = "SELECT host, name, value FROM moz_cookies WHERE host LIKE '%mubi.com'";

/// Reader for the Firefox `moz_cookies` table
#[derive(Debug, Default, Clone, Copy)]
pub struct FirefoxCookieDb;

impl CookieStore for FirefoxCookieDb {
    fn format(&self) -> StoreFormat {
        StoreFormat::FirefoxSqlite
    }

    fn read(&self, browser: Browser, path: &Path) -> Result<RawCookieSet> {
        let rows = with_readonly_db(path, |conn| {
            let mut stmt = conn.prepare(QUERY)?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        let cookies = rows
            .into_iter()
            .filter(|(host, _, _)| host_matches(host))
            .filter_map(|(host, name, value)| {
                debug!(%browser, host = %host, name = %name, "Found cookie");
                value.map(|v| (name, v))
            })
            .collect();
        Ok(cookies)
    }
}

/// Cookie databases under a Firefox profiles directory
///
/// A database directly inside `dir` comes first, then one per sub-profile with
/// `*.default*` profiles ahead of the rest. Unreadable entries are skipped.
pub fn profile_databases(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let direct = dir.join(COOKIE_DB_NAME);
    if direct.is_file() {
        found.push(direct);
    }

    let mut profiles: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.join(COOKIE_DB_NAME).is_file())
        .collect();
    profiles.sort_by_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        (!name.contains(".default"), name)
    });

    found.extend(profiles.into_iter().map(|p| p.join(COOKIE_DB_NAME)));
    Ok(found)
}
