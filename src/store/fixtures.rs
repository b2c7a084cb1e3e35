//! Cookie database builders shared by store tests

use rusqlite::{Connection, params};
use std::path::Path;

/// Create a Chromium-style `cookies` table; the last column is the
/// `encrypted_value` length
pub(crate) fn chromium_db(path: &Path, rows: &[(&str, &str, &str, usize)]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE cookies (host_key TEXT, name TEXT, value TEXT, encrypted_value BLOB)",
    )
    .unwrap();
    for (host, name, value, encrypted) in rows {
        conn.execute(
            "INSERT INTO cookies VALUES (?1, ?2, ?3, zeroblob(?4))",
            params![host, name, value, *encrypted as i64],
        )
        .unwrap();
    }
}

/// Create a Firefox-style `moz_cookies` table
pub(crate) fn firefox_db(path: &Path, rows: &[(&str, &str, &str)]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch("CREATE TABLE moz_cookies (host TEXT, name TEXT, value TEXT)")
        .unwrap();
    for (host, name, value) in rows {
        conn.execute(
            "INSERT INTO moz_cookies VALUES (?1, ?2, ?3)",
            params![host, name, value],
        )
        .unwrap();
    }
}
