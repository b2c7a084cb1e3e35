//! Session derivation and header synthesis
//!
//! Turns a [`RawCookieSet`] into a [`Session`] and a [`Session`] into the two
//! request headers the API expects. The header encoding is a compatibility
//! contract with the web client:
//!
//! - `Authorization: Bearer <token>`
//! - `dt-custom-data: base64({"userId":..,"sessionId":..,"merchant":"mubi"})`
//!
//! # Examples
//!
//! ```rust
//! use base64::Engine as _;
//! use mubi_session::session::derivation::{derive, headers};
//! use mubi_session::types::RawCookieSet;
//!
//! let payload = r#"{"token":"abc","user_id":"u1","id":"s1"}"#;
//! let cookies = RawCookieSet::new()
//!     .with("_session", base64::engine::general_purpose::STANDARD.encode(payload))
//!     .with("remember_token", "x");
//!
//! let session = derive(&cookies)?;
//! let set = headers(&session)?;
//! assert_eq!(set.authorization, "Bearer abc");
//! # Ok::<(), mubi_session::Error>(())
//! ```

use base64::{
    Engine as _,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::STANDARD},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

use crate::types::cookies::{
    AUTH_TOKEN_COOKIE, CUSTOM_DATA_COOKIE, REMEMBER_COOKIE, SESSION_COOKIE,
};
use crate::types::serde_helpers::{deserialize_flexible_id, deserialize_unix_seconds};
use crate::types::session::{BEARER_SCHEME, MERCHANT};
use crate::types::{CookieLayout, HeaderSet, RawCookieSet, Session};
use crate::{Error, Result};

/// Standard alphabet, padding optional on decode
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded `_session` cookie
#[derive(Debug, Deserialize)]
struct SessionPayload {
    token: String,
    #[serde(deserialize_with = "deserialize_flexible_id")]
    user_id: String,
    #[serde(rename = "id", deserialize_with = "deserialize_flexible_id")]
    session_id: String,
    #[serde(default, deserialize_with = "deserialize_unix_seconds")]
    exp: Option<DateTime<Utc>>,
}

/// Decoded `dt-custom-data` value
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomData {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    user_id: String,
    #[serde(deserialize_with = "deserialize_flexible_id")]
    session_id: String,
    merchant: String,
}

/// Wire form of `dt-custom-data`; field order is part of the contract
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomDataRef<'a> {
    user_id: &'a str,
    session_id: &'a str,
    merchant: &'a str,
}

/// Derive a session from a cookie set holding one of the required pairs
pub fn derive(cookies: &RawCookieSet) -> Result<Session> {
    match cookies.layout() {
        Some(CookieLayout::SessionCookie) => {
            let raw = cookies
                .get(SESSION_COOKIE)
                .ok_or_else(|| Error::malformed(format!("{} cookie missing", SESSION_COOKIE)))?;
            let payload: SessionPayload = decode_json(raw, "session cookie")?;
            debug!(token_len = payload.token.len(), "Decoded session cookie");
            Session::new(payload.token, payload.user_id, payload.session_id, payload.exp)
        }
        Some(CookieLayout::AuthTokenPair) => {
            let token = cookies.get(AUTH_TOKEN_COOKIE).unwrap_or_default();
            let custom = cookies.get(CUSTOM_DATA_COOKIE).unwrap_or_default();
            Session::from_header_values(&unescape(token), custom)
        }
        None => Err(Error::malformed(format!(
            "cookie set lacks {}+{} and {}+{}",
            SESSION_COOKIE, REMEMBER_COOKIE, AUTH_TOKEN_COOKIE, CUSTOM_DATA_COOKIE
        ))),
    }
}

/// Compute the request headers for a session
///
/// Pure and deterministic: the same session always yields the same bytes.
/// Fails instead of emitting a header the HTTP layer would reject.
pub fn headers(session: &Session) -> Result<HeaderSet> {
    for (field, value) in [
        ("token", session.bearer_token()),
        ("user_id", session.user_id()),
        ("session_id", session.session_id()),
    ] {
        if value.is_empty() {
            return Err(Error::malformed(format!("{} is empty", field)));
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(Error::malformed(format!("{} contains control characters", field)));
        }
    }
    if !session.bearer_token().bytes().all(|b| b.is_ascii_graphic()) {
        return Err(Error::malformed("token is not printable ASCII"));
    }

    let custom = serde_json::to_vec(&CustomDataRef {
        user_id: session.user_id(),
        session_id: session.session_id(),
        merchant: MERCHANT,
    })?;

    Ok(HeaderSet {
        authorization: format!("{} {}", BEARER_SCHEME, session.bearer_token()),
        custom_data: STANDARD.encode(custom),
    })
}

impl Session {
    /// Build a session from operator-entered values
    ///
    /// A pasted `Bearer ` prefix is stripped from the token. Identifiers must
    /// be single words.
    pub fn from_manual(token: &str, user_id: &str, session_id: &str) -> Result<Self> {
        for (field, value) in [("user id", user_id), ("session id", session_id)] {
            if value.trim().chars().any(char::is_whitespace) {
                return Err(Error::invalid_input(format!("{} contains whitespace", field)));
            }
        }
        Self::new(strip_bearer(token), user_id, session_id, None)
    }

    /// Build a session from a bearer token and an encoded `dt-custom-data` value
    pub fn from_header_values(token: &str, custom_data: &str) -> Result<Self> {
        let data: CustomData = decode_json(custom_data, "custom data")?;
        if data.merchant.trim().is_empty() {
            return Err(Error::malformed("custom data merchant is empty"));
        }
        if data.merchant != MERCHANT {
            debug!(merchant = %data.merchant, "Unexpected merchant in custom data");
        }
        Self::new(strip_bearer(token), data.user_id, data.session_id, None)
    }
}

fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    match token.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        _ => token,
    }
}

/// Undo cookie-jar percent escaping (`%3D` padding and friends)
fn unescape(value: &str) -> Cow<'_, str> {
    let trimmed = value.trim().trim_matches('"');
    if trimmed.contains('%') {
        match urlencoding::decode(trimmed) {
            Ok(decoded) => Cow::Owned(decoded.into_owned()),
            Err(_) => Cow::Borrowed(trimmed),
        }
    } else {
        Cow::Borrowed(trimmed)
    }
}

/// Decode standard or URL-safe base64, padded or not
fn decode_base64(value: &str, what: &str) -> Result<Vec<u8>> {
    let normalized: String = unescape(value)
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    LENIENT
        .decode(normalized.as_bytes())
        .map_err(|e| Error::malformed(format!("{} is not base64: {}", what, e)))
}

fn decode_json<T: serde::de::DeserializeOwned>(value: &str, what: &str) -> Result<T> {
    let bytes = decode_base64(value, what)?;
    let mut de = serde_json::Deserializer::from_slice(&bytes);
    let decoded = serde_path_to_error::deserialize(&mut de).map_err(|e| {
        let path = e.path().to_string();
        Error::malformed(format!("{} field `{}`: {}", what, path, e.into_inner()))
    })?;
    de.end()
        .map_err(|e| Error::malformed(format!("{} has trailing data: {}", what, e)))?;
    Ok(decoded)
}
