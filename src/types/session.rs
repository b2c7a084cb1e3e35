//! Session, header and validation types
//!
//! A [`Session`] is the only long-lived credential in the crate. It is never
//! serialized, and its `Debug` output redacts the bearer token.

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::fmt;

use crate::{Error, Result};

/// Authorization scheme expected by the API
pub const BEARER_SCHEME: &str = "Bearer";
/// Header carrying the encoded custom data
pub const CUSTOM_DATA_HEADER: &str = "dt-custom-data";
/// Merchant tag embedded in the custom data
pub const MERCHANT: &str = "mubi";

/// Authenticated identity derived from browser cookies or operator input
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    bearer_token: String,
    user_id: String,
    session_id: String,
    derived_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a session, rejecting blank fields
    pub fn new(
        bearer_token: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let bearer_token = bearer_token.into().trim().to_string();
        let user_id = user_id.into().trim().to_string();
        let session_id = session_id.into().trim().to_string();

        for (field, value) in [
            ("token", &bearer_token),
            ("user_id", &user_id),
            ("session_id", &session_id),
        ] {
            if value.is_empty() {
                return Err(Error::malformed(format!("{} is empty", field)));
            }
        }
        if bearer_token.chars().any(char::is_whitespace) {
            return Err(Error::malformed("token contains whitespace"));
        }

        Ok(Self {
            bearer_token,
            user_id,
            session_id,
            derived_at: Utc::now(),
            expires_at,
        })
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn derived_at(&self) -> DateTime<Utc> {
        self.derived_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check if the session carries an expiry that has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() > at)
    }

    /// Time remaining until expiry, if the session carries one
    pub fn time_until_expiry(&self) -> Option<chrono::Duration> {
        self.expires_at.map(|at| at - Utc::now())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("bearer_token", &format_args!("[REDACTED; {} chars]", self.bearer_token.len()))
            .field("user_id", &self.user_id)
            .field("session_id", &"[REDACTED]")
            .field("derived_at", &self.derived_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The two request headers the API requires, computed from a [`Session`]
#[derive(Clone, PartialEq, Eq)]
pub struct HeaderSet {
    /// `Authorization` value (`Bearer <token>`)
    pub authorization: String,
    /// `dt-custom-data` value (base64 JSON)
    pub custom_data: String,
}

impl HeaderSet {
    /// Header name/value pairs in wire order
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [
            ("Authorization", self.authorization.as_str()),
            (CUSTOM_DATA_HEADER, self.custom_data.as_str()),
        ]
    }

    /// Convert into a `reqwest` header map, failing on invalid header bytes
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&self.authorization)
            .map_err(|e| Error::malformed(format!("authorization header: {}", e)))?;
        auth.set_sensitive(true);
        map.insert(AUTHORIZATION, auth);

        let mut custom = HeaderValue::from_str(&self.custom_data)
            .map_err(|e| Error::malformed(format!("custom data header: {}", e)))?;
        custom.set_sensitive(true);
        map.insert(HeaderName::from_static(CUSTOM_DATA_HEADER), custom);
        Ok(map)
    }
}

impl fmt::Debug for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderSet")
            .field("authorization", &"[REDACTED]")
            .field("custom_data", &"[REDACTED]")
            .finish()
    }
}

/// Verdict of a single status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The API accepted the session
    Valid,
    /// The API actively refused the session
    Rejected { status: u16 },
    /// Refused locally without a call: expired or cannot form headers
    Unusable { reason: String },
    /// No verdict: transport failure, timeout or server-side error
    Inconclusive { reason: String },
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Rejected { status } => write!(f, "rejected (HTTP {})", status),
            Self::Unusable { reason } => write!(f, "unusable ({})", reason),
            Self::Inconclusive { reason } => write!(f, "inconclusive ({})", reason),
        }
    }
}

/// Result of validating a session against the status endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub outcome: ValidationOutcome,
    pub checked_at: DateTime<Utc>,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
}

impl ValidationResult {
    pub fn valid(status: u16) -> Self {
        Self {
            outcome: ValidationOutcome::Valid,
            checked_at: Utc::now(),
            status: Some(status),
        }
    }

    pub fn rejected(status: u16) -> Self {
        Self {
            outcome: ValidationOutcome::Rejected { status },
            checked_at: Utc::now(),
            status: Some(status),
        }
    }

    pub fn unusable(reason: impl Into<String>) -> Self {
        Self {
            outcome: ValidationOutcome::Unusable {
                reason: reason.into(),
            },
            checked_at: Utc::now(),
            status: None,
        }
    }

    pub fn inconclusive(reason: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            outcome: ValidationOutcome::Inconclusive {
                reason: reason.into(),
            },
            checked_at: Utc::now(),
            status,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, ValidationOutcome::Valid)
    }

    /// Refused by the API or unusable locally
    pub fn is_rejected(&self) -> bool {
        matches!(
            self.outcome,
            ValidationOutcome::Rejected { .. } | ValidationOutcome::Unusable { .. }
        )
    }

    pub fn is_inconclusive(&self) -> bool {
        matches!(self.outcome, ValidationOutcome::Inconclusive { .. })
    }
}
