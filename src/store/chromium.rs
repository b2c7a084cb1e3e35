//! Chromium `Cookies` database (Chrome, Edge)

use std::path::Path;
use tracing::debug;

use super::{CookieStore, StoreFormat, sqlite::with_readonly_db};
use crate::types::{Browser, RawCookieSet, cookies::host_matches};
use crate::{Error, Result};

const QUERY: &str = "SELECT host_key, name, value, length(encrypted_value) \
                     FROM cookies WHERE host_key LIKE '%mubi.com'";

/// Reader for the Chromium `cookies` table
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumCookieDb;

impl CookieStore for ChromiumCookieDb {
    fn format(&self) -> StoreFormat {
        StoreFormat::ChromiumSqlite
    }

    fn read(&self, browser: Browser, path: &Path) -> Result<RawCookieSet> {
        let rows = with_readonly_db(path, |conn| {
            let mut stmt = conn.prepare(QUERY)?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;

        let mut cookies = RawCookieSet::new();
        let mut encrypted = 0usize;
        for (host, name, value, encrypted_len) in rows {
            if !host_matches(&host) {
                continue;
            }
            match value.filter(|v| !v.is_empty()) {
                Some(value) => {
                    debug!(%browser, host = %host, name = %name, "Found cookie");
                    cookies.insert(name, value);
                }
                None if encrypted_len.unwrap_or(0) > 0 => encrypted += 1,
                None => {}
            }
        }

        if !cookies.is_usable() && encrypted > 0 {
            return Err(Error::store_read(
                browser,
                path,
                format!("{} MUBI cookies are encrypted at rest", encrypted),
            ));
        }

        Ok(cookies)
    }
}
