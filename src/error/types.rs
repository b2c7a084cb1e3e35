//! Error type definitions
//!
//! Defines the error kinds raised while discovering, deriving and validating
//! a MUBI browser session. Everything except [`Error::AuthExhausted`] is
//! recovered inside the fallback chain.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Browser;

/// Why the whole authentication chain gave up.
///
/// Each kind maps to a different remedy, so the user-facing message differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// No browser on this machine holds a MUBI session
    NoBrowserSession,
    /// A session was found but the API refused it
    SessionRejected,
    /// The API could not be reached to confirm the session
    NetworkUnreachable,
    /// The operator abandoned or failed the manual prompt
    OperatorDeclined,
    /// The caller cancelled the attempt
    Cancelled,
}

impl AuthFailureKind {
    /// Remedy hint shown to the user
    pub fn remedy(&self) -> &'static str {
        match self {
            Self::NoBrowserSession => {
                "no MUBI browser session found; log in to mubi.com in a supported browser"
            }
            Self::SessionRejected => {
                "a MUBI session was found but rejected; log out and back in to mubi.com"
            }
            Self::NetworkUnreachable => {
                "the MUBI API is unreachable; check your network connection and retry"
            }
            Self::OperatorDeclined => "manual authentication was cancelled or invalid",
            Self::Cancelled => "authentication was cancelled",
        }
    }
}

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.remedy())
    }
}

/// Main error type for session authentication
#[derive(Error, Debug)]
pub enum Error {
    /// The environment detector produced no credential locations
    #[error("No candidate credential locations found")]
    NoCandidateLocations,

    /// Permission or corruption problem on one credential store
    #[error("Cannot read {browser} store at {}: {reason}", path.display())]
    StoreRead {
        browser: Browser,
        path: PathBuf,
        reason: String,
    },

    /// The scan finished but no store held the required cookie pair
    #[error("No usable MUBI cookies found ({scanned} locations scanned)")]
    NoUsableCookies { scanned: usize },

    /// The session cookie could not be decoded into a session
    #[error("Malformed session: {0}")]
    MalformedSession(String),

    /// Every fallback branch failed
    #[error("Authentication failed: {kind}")]
    AuthExhausted {
        kind: AuthFailureKind,
        attempts: Vec<String>,
    },

    /// Operator input did not have the expected shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A bounded wait ran out
    #[error("Timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    /// The caller cancelled a pending operation
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// SQLite errors while reading a cookie database
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a store read error for one location
    pub fn store_read(
        browser: Browser,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::StoreRead {
            browser,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed session error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSession(msg.into())
    }

    /// Create a terminal authentication failure
    pub fn exhausted(kind: AuthFailureKind, attempts: Vec<String>) -> Self {
        Self::AuthExhausted { kind, attempts }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, after: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds: after.as_secs(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the fallback chain may recover from this error locally
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::AuthExhausted { .. } | Self::Cancelled(_) | Self::Config(_)
        )
    }

    /// Failure kind when this error is terminal
    pub fn failure_kind(&self) -> Option<AuthFailureKind> {
        match self {
            Self::AuthExhausted { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
