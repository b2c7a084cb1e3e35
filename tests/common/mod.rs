//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

/// Test helper functions
pub mod helpers {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use mubi_session::config::Settings;
    use rusqlite::{Connection, params};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// `_session` cookie value for the given identity
    pub fn session_cookie(token: &str, user_id: &str, session_id: &str) -> String {
        let payload = serde_json::json!({
            "token": token,
            "user_id": user_id,
            "id": session_id,
        });
        STANDARD.encode(payload.to_string())
    }

    /// Settings pointing the status check at `status_url`, no prompts
    pub fn create_test_settings(status_url: &str) -> Settings {
        let mut settings = Settings::default();
        settings.validation.status_url = status_url.to_string();
        settings.validation.timeout_secs = 2;
        settings.interactive.prompts_enabled = false;
        settings.interactive.settle_delay_millis = 0;
        settings
    }

    /// A throwaway home directory with browser profile trees
    pub struct FakeHome {
        pub dir: TempDir,
    }

    impl FakeHome {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }

        /// `~/.config/google-chrome/<profile>/Network/Cookies` with `rows`
        pub fn chrome_profile(&self, profile: &str, rows: &[(&str, &str, &str)]) -> PathBuf {
            let dir = self
                .path()
                .join(".config")
                .join("google-chrome")
                .join(profile)
                .join("Network");
            std::fs::create_dir_all(&dir).unwrap();
            let db = dir.join("Cookies");
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch(
                "CREATE TABLE cookies (host_key TEXT, name TEXT, value TEXT, encrypted_value BLOB)",
            )
            .unwrap();
            for (host, name, value) in rows {
                conn.execute(
                    "INSERT INTO cookies VALUES (?1, ?2, ?3, zeroblob(0))",
                    params![host, name, value],
                )
                .unwrap();
            }
            db
        }

        /// `~/.mozilla/firefox/<profile>/cookies.sqlite` with `rows`
        pub fn firefox_profile(&self, profile: &str, rows: &[(&str, &str, &str)]) -> PathBuf {
            let dir = self.path().join(".mozilla").join("firefox").join(profile);
            std::fs::create_dir_all(&dir).unwrap();
            let db = dir.join("cookies.sqlite");
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch("CREATE TABLE moz_cookies (host TEXT, name TEXT, value TEXT)")
                .unwrap();
            for (host, name, value) in rows {
                conn.execute(
                    "INSERT INTO moz_cookies VALUES (?1, ?2, ?3)",
                    params![host, name, value],
                )
                .unwrap();
            }
            db
        }
    }
}
