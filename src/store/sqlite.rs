//! Read-only access to browser SQLite cookie databases
//!
//! Browsers keep their cookie database open and locked while running. The
//! database is first opened in place as immutable. When that fails, or when
//! a write-ahead log sits next to it, the database and its `-wal`/`-shm`
//! files are copied into a private temporary directory and read from there.

use rusqlite::{Connection, OpenFlags};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::Result;

/// Files SQLite keeps next to a database in WAL mode
const WAL_SIDECARS: [&str; 2] = ["-wal", "-shm"];

/// Run `query` against the database at `path` without writing to it
pub(crate) fn with_readonly_db<T, F>(path: &Path, query: F) -> Result<T>
where
    F: Fn(&Connection) -> rusqlite::Result<T>,
{
    // An immutable open ignores the log, and recent writes live there
    if sidecar(path, "-wal").is_file() {
        debug!(?path, "Write-ahead log present, reading from a private copy");
        return read_private_copy(path, &query);
    }

    match open_immutable(path).and_then(|conn| query(&conn)) {
        Ok(value) => Ok(value),
        Err(first) => {
            debug!(?path, error = %first, "Direct read failed, retrying from a private copy");
            read_private_copy(path, &query)
        }
    }
}

/// Copy the database with its WAL files and query the copy
fn read_private_copy<T, F>(path: &Path, query: &F) -> Result<T>
where
    F: Fn(&Connection) -> rusqlite::Result<T>,
{
    let dir = tempfile::Builder::new().prefix("mubi-cookies-").tempdir()?;
    let copy = dir
        .path()
        .join(path.file_name().unwrap_or(OsStr::new("cookies.db")));
    std::fs::copy(path, &copy)?;
    for suffix in WAL_SIDECARS {
        let source = sidecar(path, suffix);
        if source.is_file() {
            std::fs::copy(&source, sidecar(&copy, suffix))?;
        }
    }

    // The copy is private, so SQLite may replay the log into it
    let conn = Connection::open_with_flags(
        &copy,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let value = query(&conn)?;
    drop(conn);
    // `dir` and everything in it is removed when dropped
    Ok(value)
}

/// `path` with `suffix` appended to its file name
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn open_immutable(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        sqlite_uri(path),
        OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

/// `file:` URI opening `path` read-only and immutable
pub(crate) fn sqlite_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut encoded = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '%' => encoded.push_str("%25"),
            ' ' => encoded.push_str("%20"),
            '?' => encoded.push_str("%3F"),
            '#' => encoded.push_str("%23"),
            c => encoded.push(c),
        }
    }
    // Drive-letter paths need a leading slash: file:/C:/...
    let bytes = encoded.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        encoded.insert(0, '/');
    }
    format!("file:{}?mode=ro&immutable=1", encoded)
}
