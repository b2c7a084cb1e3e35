//! Session status validation
//!
//! One authenticated GET against the status endpoint. Exactly 200 is valid,
//! any other 4xx is an active rejection, everything else (5xx, transport
//! errors, timeouts) is inconclusive.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER};
use std::time::Duration;
use tracing::{debug, warn};

use super::derivation::headers;
use crate::config::Settings;
use crate::config::settings::is_country_code;
use crate::types::{Session, ValidationResult};
use crate::{Error, Result};

/// Origin the web client sends requests from
pub const WEB_ORIGIN: &str = "https://mubi.com";

/// Checks whether the API still accepts a session
#[async_trait]
pub trait StatusValidator: Send + Sync + std::fmt::Debug {
    /// Validate `session`; never fails, an unreachable API is inconclusive
    async fn validate(&self, session: &Session) -> ValidationResult;
}

/// Map an HTTP status to a validation result
pub fn classify(status: u16) -> ValidationResult {
    match status {
        200 => ValidationResult::valid(status),
        400..=499 => ValidationResult::rejected(status),
        _ => ValidationResult::inconclusive(format!("unexpected HTTP {}", status), Some(status)),
    }
}

/// [`StatusValidator`] calling the MUBI API over HTTP
#[derive(Debug, Clone)]
pub struct HttpStatusValidator {
    client: Client,
    status_url: String,
    context: HeaderMap,
    timeout: Duration,
}

impl HttpStatusValidator {
    /// Fails when `country` is not a two-letter code
    pub fn new(
        client: Client,
        status_url: impl Into<String>,
        country: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client,
            status_url: status_url.into(),
            context: context_headers(country)?,
            timeout,
        })
    }

    /// Build a validator with its own HTTP client from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::utils::version::user_agent())
            .build()?;
        Self::new(
            client,
            settings.validation.status_url.clone(),
            &settings.auth.country,
            settings.validation.timeout(),
        )
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }
}

/// Context headers the web client sends with every API call
fn context_headers(country: &str) -> Result<HeaderMap> {
    if !is_country_code(country) {
        return Err(Error::config(format!(
            "Invalid country code {:?}: expected two ASCII letters",
            country
        )));
    }
    let client_country = HeaderValue::from_str(country)
        .map_err(|e| Error::config(format!("Invalid country code: {}", e)))?;

    let mut map = HeaderMap::new();
    map.insert(HeaderName::from_static("client"), HeaderValue::from_static("web"));
    map.insert(HeaderName::from_static("client-country"), client_country);
    map.insert(ORIGIN, HeaderValue::from_static(WEB_ORIGIN));
    map.insert(REFERER, HeaderValue::from_static("https://mubi.com/"));
    map.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(map)
}

#[async_trait]
impl StatusValidator for HttpStatusValidator {
    async fn validate(&self, session: &Session) -> ValidationResult {
        if session.is_expired() {
            debug!("Session expired, skipping status call");
            return ValidationResult::unusable("session expired");
        }

        let auth = match headers(session).and_then(|set| set.to_header_map()) {
            Ok(map) => map,
            Err(e) => return ValidationResult::unusable(e.to_string()),
        };
        let response = self
            .client
            .get(&self.status_url)
            .headers(self.context.clone())
            .headers(auth)
            .timeout(self.timeout)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status().as_u16();
                let result = classify(status);
                debug!(status, outcome = %result.outcome, "Status check completed");
                result
            }
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout.as_secs(), "Status check timed out");
                ValidationResult::inconclusive(
                    format!("timed out after {}ms", self.timeout.as_millis()),
                    None,
                )
            }
            Err(e) => {
                warn!(error = %e, "Status check failed");
                ValidationResult::inconclusive(format!("transport error: {}", e), None)
            }
        }
    }
}
