//! Netscape `cookies.txt` export
//!
//! Seven TAB-separated fields per line: domain, tailmatch, path, secure,
//! expires, name, value. `#HttpOnly_` prefixed lines are cookies, every
//! other `#` line is a comment. Malformed lines are skipped with a warning.

use std::io::BufRead;
use std::path::Path;
use tracing::{debug, warn};

use super::{CookieStore, StoreFormat};
use crate::types::{Browser, RawCookieSet, cookies::host_matches};
use crate::{Error, Result};

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// Reader for exported `cookies.txt` files
#[derive(Debug, Default, Clone, Copy)]
pub struct NetscapeCookieFile;

impl NetscapeCookieFile {
    /// Parse MUBI cookies from a cookies.txt stream
    pub fn parse(reader: impl BufRead) -> Result<RawCookieSet> {
        let mut cookies = RawCookieSet::new();
        let mut malformed = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            let line = match line.strip_prefix(HTTP_ONLY_PREFIX) {
                Some(rest) => rest,
                None if line.trim().is_empty() || line.starts_with('#') => continue,
                None => line,
            };

            let fields: Vec<&str> = line.split('\t').collect();
            let &[domain, _tailmatch, _path, _secure, _expires, name, value, ..] = fields.as_slice()
            else {
                warn!(
                    line = idx + 1,
                    fields = fields.len(),
                    "Skipping malformed cookie line"
                );
                malformed += 1;
                continue;
            };

            if host_matches(domain) {
                debug!(line = idx + 1, domain = %domain, name = %name, "Found cookie");
                cookies.insert(name, value.trim());
            }
        }

        if cookies.is_empty() && malformed > 0 {
            return Err(Error::invalid_input(format!(
                "no valid cookie lines ({} malformed)",
                malformed
            )));
        }
        Ok(cookies)
    }

    /// Parse MUBI cookies from a cookies.txt file
    pub fn load(path: &Path) -> Result<RawCookieSet> {
        let file = std::fs::File::open(path)?;
        Self::parse(std::io::BufReader::new(file))
    }
}

impl CookieStore for NetscapeCookieFile {
    fn format(&self) -> StoreFormat {
        StoreFormat::NetscapeText
    }

    fn read(&self, browser: Browser, path: &Path) -> Result<RawCookieSet> {
        Self::load(path).map_err(|e| match e {
            Error::Io(io) => Error::store_read(browser, path, io.to_string()),
            other => other,
        })
    }
}
