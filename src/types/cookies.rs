//! Raw cookie values read from a browser store
//!
//! A [`RawCookieSet`] only lives between a store read and session derivation.
//! Its `Debug` output lists cookie names, never values.

use std::collections::BTreeMap;
use std::fmt;

/// Domain whose cookies carry the MUBI session
pub const TARGET_DOMAIN: &str = "mubi.com";

/// Primary session cookie (base64 JSON payload)
pub const SESSION_COOKIE: &str = "_session";
/// Companion cookie that must accompany `_session`
pub const REMEMBER_COOKIE: &str = "remember_token";
/// Bearer token cookie in the newer web-client layout
pub const AUTH_TOKEN_COOKIE: &str = "authToken";
/// Pre-encoded `dt-custom-data` cookie in the newer web-client layout
pub const CUSTOM_DATA_COOKIE: &str = "dtCustomData";

/// Which pair of required cookies a set carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieLayout {
    /// `_session` + `remember_token`
    SessionCookie,
    /// `authToken` + `dtCustomData`
    AuthTokenPair,
}

/// Cookie name to value mapping, scoped to [`TARGET_DOMAIN`]
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawCookieSet {
    cookies: BTreeMap<String, String>,
}

impl RawCookieSet {
    /// Create an empty cookie set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cookie; empty values are ignored
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.cookies.insert(name.into(), value);
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a cookie value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Cookie names present in the set
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// The required cookie pair this set carries, preferring `_session`
    pub fn layout(&self) -> Option<CookieLayout> {
        let has = |name: &str| self.cookies.contains_key(name);
        if has(SESSION_COOKIE) && has(REMEMBER_COOKIE) {
            Some(CookieLayout::SessionCookie)
        } else if has(AUTH_TOKEN_COOKIE) && has(CUSTOM_DATA_COOKIE) {
            Some(CookieLayout::AuthTokenPair)
        } else {
            None
        }
    }

    /// Whether the set holds a complete required pair
    pub fn is_usable(&self) -> bool {
        self.layout().is_some()
    }
}

impl fmt::Debug for RawCookieSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCookieSet")
            .field("names", &self.cookies.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawCookieSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Whether a cookie host key belongs to [`TARGET_DOMAIN`]
///
/// Accepts `mubi.com`, `.mubi.com` and any subdomain; rejects look-alikes
/// such as `notmubi.com`.
pub fn host_matches(host: &str) -> bool {
    let host = host.trim().trim_start_matches('.').to_ascii_lowercase();
    host == TARGET_DOMAIN || host.ends_with(&format!(".{}", TARGET_DOMAIN))
}
