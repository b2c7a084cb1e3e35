//! # Authentication Manager
//!
//! [`AuthManagerGeneric`] is the facade the rest of a downloader talks to.
//! It owns the credential cache, the status validator and the fallback
//! chain, and hands out request headers computed from the current session.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use mubi_session::config::Settings;
//! use mubi_session::environment::EnvironmentDetector;
//! use mubi_session::session::AuthManager;
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let detection = EnvironmentDetector::from_host().detect(&settings.browser_order());
//! let manager = AuthManager::new(settings, &detection)?;
//!
//! let headers = manager.ensure_authenticated().await?;
//! for (name, _value) in headers.pairs() {
//!     println!("{}", name);
//! }
//! # Ok::<(), mubi_session::Error>(())
//! # });
//! ```
//!
//! ## Freshness
//!
//! A session validated within the heartbeat interval is served without a
//! network call. Otherwise [`current_headers`](AuthManagerGeneric::current_headers)
//! revalidates under a short timeout and falls back to the cached session
//! marked `stale` when the API is slow.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::CredentialCache;
use super::derivation::headers;
use super::fallback::{FallbackChain, FallbackOptions, FallbackTrigger};
use super::monitor::Heartbeat;
use super::operator::{Operator, TerminalOperator};
use super::validator::{HttpStatusValidator, StatusValidator};
use crate::config::{DisplayMode, Settings};
use crate::environment::Detection;
use crate::store::CredentialStoreReader;
use crate::types::{CredentialLocation, HeaderSet, Session, ValidationResult};
use crate::Result;

/// Convenience type alias for the manager wired to HTTP and the terminal
pub type AuthManager = AuthManagerGeneric<HttpStatusValidator, TerminalOperator>;

/// Headers plus how fresh the underlying session is
#[derive(Debug, Clone)]
pub struct CurrentHeaders {
    pub headers: HeaderSet,
    /// The session could not be confirmed within the header timeout
    pub stale: bool,
    /// When the session was last confirmed valid
    pub validated_at: Option<DateTime<Utc>>,
}

/// Authentication facade for API consumers
#[derive(Debug)]
pub struct AuthManagerGeneric<V = HttpStatusValidator, O = TerminalOperator> {
    /// Configuration settings
    settings: Arc<Settings>,
    pub(crate) cache: Arc<CredentialCache>,
    pub(crate) validator: Arc<V>,
    pub(crate) chain: Arc<FallbackChain<V, O>>,
}

impl AuthManagerGeneric<HttpStatusValidator, TerminalOperator> {
    /// Creates a manager over the detected credential locations.
    ///
    /// Uses an HTTP validator against the configured status endpoint and a
    /// terminal operator on stdin/stderr.
    pub fn new(settings: Settings, detection: &Detection) -> Result<Self> {
        let validator = HttpStatusValidator::from_settings(&settings)?;
        let display = match settings.interactive.display {
            DisplayMode::Auto => detection.display_available,
            DisplayMode::Always => true,
            DisplayMode::Never => false,
        };
        let operator = TerminalOperator::stdin(display);
        Ok(Self::with_components(
            settings,
            detection.candidates.clone(),
            validator,
            operator,
        ))
    }
}

impl<V, O> AuthManagerGeneric<V, O>
where
    V: StatusValidator + 'static,
    O: Operator + 'static,
{
    /// Creates a manager with custom validator and operator implementations
    pub fn with_components(
        settings: Settings,
        candidates: Vec<CredentialLocation>,
        validator: V,
        operator: O,
    ) -> Self {
        let cache = Arc::new(CredentialCache::new());
        let validator = Arc::new(validator);
        let chain = FallbackChain::new(
            candidates,
            CredentialStoreReader::from_settings(&settings.store),
            Arc::clone(&validator),
            Arc::new(operator),
            Arc::clone(&cache),
            FallbackOptions::from_settings(&settings),
        );

        Self {
            settings: Arc::new(settings),
            cache,
            validator,
            chain: Arc::new(chain),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    pub fn fallback(&self) -> &FallbackChain<V, O> {
        &self.chain
    }

    /// Headers for the next API call, authenticating first if needed.
    ///
    /// Blocks until a confirmed (or optimistically accepted) session exists.
    /// Fails only with [`crate::Error::AuthExhausted`] or a malformed session.
    pub async fn ensure_authenticated(&self) -> Result<HeaderSet> {
        self.ensure_authenticated_with(&CancellationToken::new())
            .await
    }

    /// Like [`ensure_authenticated`](Self::ensure_authenticated), abandoning
    /// any interactive wait when `cancel` fires
    pub async fn ensure_authenticated_with(&self, cancel: &CancellationToken) -> Result<HeaderSet> {
        let session = self.authenticated_session(cancel).await?;
        headers(&session)
    }

    /// Headers without waiting longer than the header timeout on validation.
    ///
    /// When the status check is slower than the timeout the cached session's
    /// headers are returned with `stale` set. With nothing cached this runs
    /// the fallback chain like [`ensure_authenticated`](Self::ensure_authenticated).
    pub async fn current_headers(&self) -> Result<CurrentHeaders> {
        let cancel = CancellationToken::new();
        let Some(cached) = self.cache.snapshot().await else {
            let session = self.chain.run(FallbackTrigger::Startup, &cancel).await?;
            return self.fresh(&session).await;
        };

        if self.is_fresh(cached.last_validation.as_ref()) {
            return Ok(CurrentHeaders {
                headers: headers(&cached.session)?,
                stale: false,
                validated_at: cached.last_validation.map(|v| v.checked_at),
            });
        }

        let timeout = self.settings.validation.header_timeout();
        match tokio::time::timeout(timeout, self.validator.validate(&cached.session)).await {
            Err(_) => {
                debug!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Validation slow, serving cached session"
                );
                Ok(CurrentHeaders {
                    headers: headers(&cached.session)?,
                    stale: true,
                    validated_at: cached
                        .last_validation
                        .filter(ValidationResult::is_valid)
                        .map(|v| v.checked_at),
                })
            }
            Ok(result) if result.is_rejected() => {
                info!(outcome = %result.outcome, "Cached session refused");
                self.cache.clear_if_current(&cached.session).await;
                let session = self.chain.run(FallbackTrigger::Rejected, &cancel).await?;
                self.fresh(&session).await
            }
            Ok(result) => {
                let stale = !result.is_valid();
                let validated_at = result.is_valid().then_some(result.checked_at);
                self.cache
                    .record_validation(&cached.session, result)
                    .await;
                Ok(CurrentHeaders {
                    headers: headers(&cached.session)?,
                    stale,
                    validated_at,
                })
            }
        }
    }

    /// Drop the cached session and run the fallback chain
    pub async fn force_reauth(&self) -> Result<HeaderSet> {
        info!("Forced re-authentication");
        self.cache.clear().await;
        let session = self
            .chain
            .run(FallbackTrigger::Forced, &CancellationToken::new())
            .await?;
        headers(&session)
    }

    /// Start the background heartbeat; it stops when `shutdown` is cancelled
    pub fn spawn_heartbeat(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let heartbeat = Heartbeat::new(Arc::clone(self));
        tokio::spawn(heartbeat.run(shutdown))
    }

    /// Cached, confirmed or freshly resolved session
    async fn authenticated_session(&self, cancel: &CancellationToken) -> Result<Arc<Session>> {
        let Some(cached) = self.cache.snapshot().await else {
            return self.chain.run(FallbackTrigger::Startup, cancel).await;
        };

        if self.is_fresh(cached.last_validation.as_ref()) {
            return Ok(cached.session);
        }

        let result = self.validator.validate(&cached.session).await;
        if result.is_rejected() {
            info!(outcome = %result.outcome, "Cached session refused");
            self.cache.clear_if_current(&cached.session).await;
            return self.chain.run(FallbackTrigger::Rejected, cancel).await;
        }

        if result.is_inconclusive() {
            warn!(outcome = %result.outcome, "Using cached session without confirmation");
        }
        self.cache.record_validation(&cached.session, result).await;
        Ok(cached.session)
    }

    async fn fresh(&self, session: &Arc<Session>) -> Result<CurrentHeaders> {
        let validated_at = self
            .cache
            .snapshot()
            .await
            .filter(|c| Arc::ptr_eq(&c.session, session))
            .and_then(|c| c.last_validation)
            .filter(ValidationResult::is_valid)
            .map(|v| v.checked_at);
        Ok(CurrentHeaders {
            headers: headers(session)?,
            stale: validated_at.is_none(),
            validated_at,
        })
    }

    /// Whether a validation is recent enough to skip the status call
    fn is_fresh(&self, last: Option<&ValidationResult>) -> bool {
        let Some(last) = last.filter(|v| v.is_valid()) else {
            return false;
        };
        let interval = self.settings.validation.heartbeat_interval();
        match chrono::Duration::from_std(interval) {
            Ok(interval) => Utc::now() - last.checked_at < interval,
            Err(_) => true,
        }
    }
}
