//! MUBI Session - browser-session authentication for MUBI API clients
//!
//! Finds an existing MUBI login in the user's browsers, turns it into the
//! `Authorization` and `dt-custom-data` request headers, and keeps that
//! session alive for the lifetime of a download job.
//!
//! # Architecture
//!
//! - **Environment detection**: classifies the host (Linux, Windows, WSL)
//!   and lists candidate cookie stores per browser
//! - **Credential store reading**: read-only extraction of `mubi.com`
//!   cookies from Chromium and Firefox SQLite stores or `cookies.txt`
//! - **Session derivation**: decodes the session cookie and builds headers
//! - **Validation and heartbeat**: classifies the session with a status call
//!   and re-checks it periodically
//! - **Fallback chain**: discovery, then interactive login, then manual entry
//!
//! Sessions live only in memory. Nothing is written to disk or exported
//! through the environment.
//!
//! # Usage
//!
//! ```bash
//! mubi-auth --browser firefox --print-headers
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use mubi_session::{AuthManager, Settings};
//! use mubi_session::environment::EnvironmentDetector;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::default();
//! let detection = EnvironmentDetector::from_host().detect(&settings.browser_order());
//! let manager = AuthManager::new(settings, &detection)?;
//! let headers = manager.ensure_authenticated().await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{AuthFailureKind, Error, Result};
pub use session::{AuthManager, AuthManagerGeneric, CurrentHeaders};
pub use types::{HeaderSet, Session};
