//! Authentication fallback chain
//!
//! ```text
//! Idle -> Discovering -> Resolved
//!                     -> NeedsInteractiveLogin -> Discovering -> Resolved
//!                     -> NeedsManualInput -> Resolved | Failed
//! ```
//!
//! Only one attempt runs at a time. Callers that trigger the chain while an
//! attempt is in flight wait for it and share its outcome instead of
//! starting another one. Once an attempt ends the chain is `Idle` again; a
//! failed attempt is only retried on a new trigger.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::CredentialCache;
use super::derivation::derive;
use super::operator::{ManualCredentials, Operator};
use super::validator::StatusValidator;
use crate::config::Settings;
use crate::error::AuthFailureKind;
use crate::store::{CredentialStoreReader, NetscapeCookieFile};
use crate::types::{CredentialLocation, Session, ValidationOutcome, ValidationResult};
use crate::{Error, Result};

/// Fallback chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackState {
    Idle,
    Discovering,
    NeedsInteractiveLogin,
    NeedsManualInput,
    Resolved,
    Failed,
}

impl fmt::Display for FallbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::NeedsInteractiveLogin => "needs_interactive_login",
            Self::NeedsManualInput => "needs_manual_input",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What started an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTrigger {
    /// No session cached yet
    Startup,
    /// The API refused the cached session
    Rejected,
    /// Too many consecutive inconclusive checks
    Inconclusive,
    /// Explicit re-authentication request
    Forced,
}

/// Fallback behaviour knobs
#[derive(Debug, Clone)]
pub struct FallbackOptions {
    pub login_url: String,
    pub prompts_enabled: bool,
    pub login_wait: Duration,
    pub settle_delay: Duration,
    pub manual_attempts: u32,
}

impl FallbackOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            login_url: settings.auth.login_url.clone(),
            prompts_enabled: settings.interactive.prompts_enabled,
            login_wait: settings.interactive.login_wait(),
            settle_delay: settings.interactive.settle_delay(),
            manual_attempts: settings.interactive.manual_attempts,
        }
    }
}

#[derive(Debug, Clone)]
enum AttemptOutcome {
    Resolved(Arc<Session>),
    Failed {
        kind: AuthFailureKind,
        attempts: Vec<String>,
    },
}

impl AttemptOutcome {
    fn into_result(self) -> Result<Arc<Session>> {
        match self {
            Self::Resolved(session) => Ok(session),
            Self::Failed { kind, attempts } => Err(Error::exhausted(kind, attempts)),
        }
    }
}

#[derive(Debug, Default)]
struct AttemptSlot {
    generation: u64,
    last: Option<AttemptOutcome>,
}

/// Findings collected while walking the chain, used to pick the failure kind
#[derive(Debug, Default)]
struct Findings {
    notes: Vec<String>,
    rejected: bool,
    unreachable: bool,
    operator_declined: bool,
}

impl Findings {
    fn note(&mut self, note: impl Into<String>) {
        let note = note.into();
        debug!(note = %note, "Fallback step failed");
        self.notes.push(note);
    }

    fn failure_kind(&self, trigger: FallbackTrigger) -> AuthFailureKind {
        if self.rejected {
            AuthFailureKind::SessionRejected
        } else if self.unreachable || trigger == FallbackTrigger::Inconclusive {
            AuthFailureKind::NetworkUnreachable
        } else if self.operator_declined {
            AuthFailureKind::OperatorDeclined
        } else {
            AuthFailureKind::NoBrowserSession
        }
    }
}

/// Sets the published state back to `Idle` when an attempt ends or is dropped
struct IdleOnDrop<'a>(&'a watch::Sender<FallbackState>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(FallbackState::Idle);
    }
}

/// Single-flight authentication recovery
#[derive(Debug)]
pub struct FallbackChain<V, O> {
    candidates: Vec<CredentialLocation>,
    reader: CredentialStoreReader,
    validator: Arc<V>,
    operator: Arc<O>,
    cache: Arc<CredentialCache>,
    options: FallbackOptions,
    slot: Mutex<AttemptSlot>,
    generation: AtomicU64,
    state: watch::Sender<FallbackState>,
    history: StdMutex<Vec<FallbackState>>,
}

impl<V, O> FallbackChain<V, O>
where
    V: StatusValidator,
    O: Operator,
{
    pub fn new(
        candidates: Vec<CredentialLocation>,
        reader: CredentialStoreReader,
        validator: Arc<V>,
        operator: Arc<O>,
        cache: Arc<CredentialCache>,
        options: FallbackOptions,
    ) -> Self {
        let (state, _) = watch::channel(FallbackState::Idle);
        Self {
            candidates,
            reader,
            validator,
            operator,
            cache,
            options,
            slot: Mutex::new(AttemptSlot::default()),
            generation: AtomicU64::new(0),
            state,
            history: StdMutex::new(Vec::new()),
        }
    }

    /// Current state
    pub fn state(&self) -> FallbackState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<FallbackState> {
        self.state.subscribe()
    }

    /// States visited by the most recent (or running) attempt
    pub fn history(&self) -> Vec<FallbackState> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of attempts that have finished
    pub fn completed_attempts(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Run the chain, or join the attempt already in flight
    ///
    /// Publishes the resolved session into the credential cache. The only
    /// error returned is [`Error::AuthExhausted`].
    pub async fn run(
        &self,
        trigger: FallbackTrigger,
        cancel: &CancellationToken,
    ) -> Result<Arc<Session>> {
        let seen = self.generation.load(Ordering::SeqCst);
        // Leaving the queue does not disturb the attempt in flight
        let mut slot = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(?trigger, "Caller cancelled while waiting for the attempt in flight");
                return Err(Error::exhausted(
                    AuthFailureKind::Cancelled,
                    vec!["caller cancelled while waiting for the attempt in flight".to_string()],
                ));
            }
            slot = self.slot.lock() => slot,
        };

        if slot.generation != seen {
            match &slot.last {
                Some(AttemptOutcome::Failed {
                    kind: AuthFailureKind::Cancelled,
                    ..
                }) => debug!("Joined attempt was cancelled, starting a new one"),
                Some(outcome) => {
                    debug!(?trigger, "Sharing outcome of the attempt that was in flight");
                    return outcome.clone().into_result();
                }
                None => {}
            }
        }

        let outcome = {
            let _idle = IdleOnDrop(&self.state);
            self.reset_history();
            info!(?trigger, "Authentication fallback started");
            self.attempt(trigger, cancel).await
        };

        slot.generation += 1;
        slot.last = Some(outcome.clone());
        self.generation.store(slot.generation, Ordering::SeqCst);
        outcome.into_result()
    }

    fn reset_history(&self) {
        let mut history = self
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        history.clear();
        history.push(FallbackState::Idle);
    }

    fn transition(&self, next: FallbackState) {
        debug!(from = %self.state(), to = %next, "Fallback transition");
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(next);
        self.state.send_replace(next);
    }

    async fn attempt(
        &self,
        trigger: FallbackTrigger,
        cancel: &CancellationToken,
    ) -> AttemptOutcome {
        let mut findings = Findings::default();

        self.transition(FallbackState::Discovering);
        if let Some(session) = self.discover(&mut findings).await {
            return self.resolve(session).await;
        }

        if self.options.prompts_enabled && self.operator.display_available() {
            self.transition(FallbackState::NeedsInteractiveLogin);
            match self.interactive_login(cancel).await {
                Ok(()) => {
                    self.transition(FallbackState::Discovering);
                    if let Some(session) = self.discover(&mut findings).await {
                        return self.resolve(session).await;
                    }
                }
                Err(Error::Cancelled(reason)) => {
                    findings.note(format!("interactive login: {}", reason));
                    return self.fail(AuthFailureKind::Cancelled, findings);
                }
                Err(e) => findings.note(format!("interactive login: {}", e)),
            }
        }

        self.transition(FallbackState::NeedsManualInput);
        if !self.options.prompts_enabled {
            findings.note("manual input disabled");
            let kind = findings.failure_kind(trigger);
            return self.fail(kind, findings);
        }

        match self.manual_input(cancel, &mut findings).await {
            Ok(Some(session)) => self.resolve(session).await,
            Ok(None) => {
                let kind = findings.failure_kind(trigger);
                self.fail(kind, findings)
            }
            Err(e) => {
                findings.note(format!("manual input: {}", e));
                self.fail(AuthFailureKind::Cancelled, findings)
            }
        }
    }

    /// Read the stores, derive a session and check it with the API
    async fn discover(&self, findings: &mut Findings) -> Option<(Session, ValidationResult)> {
        let outcome = self.reader.read(&self.candidates).await;
        for diagnostic in &outcome.diagnostics {
            findings.note(format!(
                "{} {}: {}",
                diagnostic.browser,
                diagnostic.path.display(),
                diagnostic.reason
            ));
        }

        let found = match outcome.into_found() {
            Ok(found) => found,
            Err(e) => {
                findings.note(e.to_string());
                return None;
            }
        };

        let session = match derive(&found.cookies) {
            Ok(session) => session,
            Err(e) => {
                findings.note(format!("{} cookies: {}", found.browser, e));
                return None;
            }
        };

        self.check(session, &format!("{} session", found.browser), findings)
            .await
    }

    /// Validate a candidate session; inconclusive checks are accepted
    async fn check(
        &self,
        session: Session,
        source: &str,
        findings: &mut Findings,
    ) -> Option<(Session, ValidationResult)> {
        let result = self.validator.validate(&session).await;
        match &result.outcome {
            ValidationOutcome::Valid => Some((session, result)),
            ValidationOutcome::Inconclusive { reason } => {
                warn!(reason = %reason, "Could not confirm {}, using it anyway", source);
                findings.unreachable = true;
                Some((session, result))
            }
            outcome => {
                findings.rejected = true;
                findings.note(format!("{} {}", source, outcome));
                None
            }
        }
    }

    async fn interactive_login(&self, cancel: &CancellationToken) -> Result<()> {
        self.operator.open_login_page(&self.options.login_url).await?;

        let wait = self.options.login_wait;
        let confirmed = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::cancelled("caller abandoned the login wait"));
            }
            result = tokio::time::timeout(wait, self.operator.confirm_login()) => {
                result.map_err(|_| Error::timeout("waiting for browser login", wait))??
            }
        };
        if !confirmed {
            return Err(Error::invalid_input("operator skipped browser login"));
        }

        // Give the browser time to flush its cookie store
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::cancelled("caller abandoned the login wait")),
            _ = tokio::time::sleep(self.options.settle_delay) => Ok(()),
        }
    }

    async fn manual_input(
        &self,
        cancel: &CancellationToken,
        findings: &mut Findings,
    ) -> Result<Option<(Session, ValidationResult)>> {
        let max = self.options.manual_attempts;
        let mut problem: Option<String> = None;

        for attempt in 1..=max {
            let request = self
                .operator
                .request_credentials(attempt, max, problem.as_deref());
            let credentials = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::cancelled("caller abandoned manual input")),
                credentials = request => credentials?,
            };

            let Some(credentials) = credentials else {
                findings.operator_declined = true;
                findings.note("operator declined manual input");
                return Ok(None);
            };

            let session = match session_from_manual(credentials) {
                Ok(session) => session,
                Err(e) => {
                    findings.operator_declined = true;
                    findings.note(format!("manual attempt {}: {}", attempt, e));
                    problem = Some(e.to_string());
                    continue;
                }
            };

            let before = findings.notes.len();
            if let Some(resolved) = self
                .check(session, "manually entered session", findings)
                .await
            {
                return Ok(Some(resolved));
            }
            problem = findings.notes.get(before).cloned();
        }

        findings.operator_declined = true;
        findings.note(format!("manual input failed {} times", max));
        Ok(None)
    }

    async fn resolve(&self, (session, result): (Session, ValidationResult)) -> AttemptOutcome {
        let stored = self.cache.replace_validated(session, result).await;
        self.transition(FallbackState::Resolved);
        info!("Authentication resolved");
        AttemptOutcome::Resolved(stored)
    }

    fn fail(&self, kind: AuthFailureKind, findings: Findings) -> AttemptOutcome {
        self.transition(FallbackState::Failed);
        warn!(%kind, steps = findings.notes.len(), "Authentication fallback exhausted");
        AttemptOutcome::Failed {
            kind,
            attempts: findings.notes,
        }
    }
}

fn session_from_manual(credentials: ManualCredentials) -> Result<Session> {
    match credentials {
        ManualCredentials::CookieFile(path) => session_from_cookie_file(&path),
        ManualCredentials::Token {
            token,
            user_id,
            session_id,
        } => Session::from_manual(&token, &user_id, &session_id),
        ManualCredentials::HeaderValues { token, custom_data } => {
            Session::from_header_values(&token, &custom_data)
        }
    }
}

fn session_from_cookie_file(path: &Path) -> Result<Session> {
    let cookies = NetscapeCookieFile::load(path)?;
    if !cookies.is_usable() {
        return Err(Error::invalid_input(format!(
            "{} holds no MUBI session cookies",
            path.display()
        )));
    }
    derive(&cookies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug)]
    struct FixedValidator(ValidationResult);

    #[async_trait]
    impl StatusValidator for FixedValidator {
        async fn validate(&self, _session: &Session) -> ValidationResult {
            self.0.clone()
        }
    }

    #[derive(Debug, Default)]
    struct ScriptedOperator {
        display: bool,
        answers: StdMutex<VecDeque<Option<ManualCredentials>>>,
        prompts: AtomicUsize,
        launches: AtomicUsize,
        hang_on_confirm: bool,
    }

    #[async_trait]
    impl Operator for ScriptedOperator {
        fn display_available(&self) -> bool {
            self.display
        }

        async fn open_login_page(&self, _url: &str) -> Result<()> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn confirm_login(&self) -> Result<bool> {
            if self.hang_on_confirm {
                std::future::pending::<()>().await;
            }
            Ok(true)
        }

        async fn request_credentials(
            &self,
            _attempt: u32,
            _max: u32,
            _problem: Option<&str>,
        ) -> Result<Option<ManualCredentials>> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok(self.answers.lock().unwrap().pop_front().flatten())
        }
    }

    fn token(value: &str) -> Option<ManualCredentials> {
        Some(ManualCredentials::Token {
            token: value.to_string(),
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
        })
    }

    fn options(prompts: bool) -> FallbackOptions {
        FallbackOptions {
            login_url: "https://mubi.com/login".to_string(),
            prompts_enabled: prompts,
            login_wait: Duration::from_secs(5),
            settle_delay: Duration::from_millis(1),
            manual_attempts: 2,
        }
    }

    fn chain(
        validator: ValidationResult,
        operator: ScriptedOperator,
        prompts: bool,
    ) -> FallbackChain<FixedValidator, ScriptedOperator> {
        FallbackChain::new(
            Vec::new(),
            CredentialStoreReader::new(Duration::from_secs(1)),
            Arc::new(FixedValidator(validator)),
            Arc::new(operator),
            Arc::new(CredentialCache::new()),
            options(prompts),
        )
    }

    #[tokio::test]
    async fn test_headless_goes_to_manual_input() {
        let operator = ScriptedOperator {
            answers: StdMutex::new(VecDeque::from([token("abc")])),
            ..Default::default()
        };
        let chain = chain(ValidationResult::valid(200), operator, true);

        let session = chain
            .run(FallbackTrigger::Startup, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(session.bearer_token(), "abc");
        assert_eq!(
            chain.history(),
            vec![
                FallbackState::Idle,
                FallbackState::Discovering,
                FallbackState::NeedsManualInput,
                FallbackState::Resolved,
            ]
        );
        assert_eq!(chain.state(), FallbackState::Idle);
        assert_eq!(chain.operator.launches.load(Ordering::SeqCst), 0);
        assert!(chain.cache.current().await.is_some());
    }

    #[tokio::test]
    async fn test_display_tries_browser_login_then_manual() {
        let operator = ScriptedOperator {
            display: true,
            answers: StdMutex::new(VecDeque::from([token("abc")])),
            ..Default::default()
        };
        let chain = chain(ValidationResult::valid(200), operator, true);

        chain
            .run(FallbackTrigger::Startup, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            chain.history(),
            vec![
                FallbackState::Idle,
                FallbackState::Discovering,
                FallbackState::NeedsInteractiveLogin,
                FallbackState::Discovering,
                FallbackState::NeedsManualInput,
                FallbackState::Resolved,
            ]
        );
        assert_eq!(chain.operator.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prompts_disabled_fails_with_no_browser_session() {
        let chain = chain(ValidationResult::valid(200), ScriptedOperator::default(), false);
        let err = chain
            .run(FallbackTrigger::Startup, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.failure_kind(), Some(AuthFailureKind::NoBrowserSession));
        assert_eq!(chain.history().last(), Some(&FallbackState::Failed));
        assert_eq!(chain.operator.prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_manual_session_is_reported() {
        let operator = ScriptedOperator {
            answers: StdMutex::new(VecDeque::from([token("a"), token("b")])),
            ..Default::default()
        };
        let chain = chain(ValidationResult::rejected(401), operator, true);

        let err = chain
            .run(FallbackTrigger::Startup, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(AuthFailureKind::SessionRejected));
        assert_eq!(chain.operator.prompts.load(Ordering::SeqCst), 2);
        assert!(chain.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_manual_input_is_bounded() {
        let bad = Some(ManualCredentials::Token {
            token: "".to_string(),
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
        });
        let operator = ScriptedOperator {
            answers: StdMutex::new(VecDeque::from([bad.clone(), bad.clone(), bad])),
            ..Default::default()
        };
        let chain = chain(ValidationResult::valid(200), operator, true);

        let err = chain
            .run(FallbackTrigger::Startup, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(AuthFailureKind::OperatorDeclined));
        assert_eq!(chain.operator.prompts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel_interactive_wait() {
        let operator = ScriptedOperator {
            display: true,
            hang_on_confirm: true,
            ..Default::default()
        };
        let chain = Arc::new(chain(ValidationResult::valid(200), operator, true));
        let cancel = CancellationToken::new();

        let task = {
            let chain = Arc::clone(&chain);
            let cancel = cancel.clone();
            tokio::spawn(async move { chain.run(FallbackTrigger::Startup, &cancel).await })
        };

        let mut states = chain.subscribe();
        states
            .wait_for(|s| *s == FallbackState::NeedsInteractiveLogin)
            .await
            .unwrap();
        cancel.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.failure_kind(), Some(AuthFailureKind::Cancelled));
        assert_eq!(chain.state(), FallbackState::Idle);
        assert!(chain.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_waiting_caller_can_cancel_without_ending_attempt() {
        let operator = ScriptedOperator {
            display: true,
            hang_on_confirm: true,
            ..Default::default()
        };
        let chain = Arc::new(chain(ValidationResult::valid(200), operator, true));
        let leader_cancel = CancellationToken::new();

        let leader = {
            let chain = Arc::clone(&chain);
            let cancel = leader_cancel.clone();
            tokio::spawn(async move { chain.run(FallbackTrigger::Startup, &cancel).await })
        };
        let mut states = chain.subscribe();
        states
            .wait_for(|s| *s == FallbackState::NeedsInteractiveLogin)
            .await
            .unwrap();

        let waiter_cancel = CancellationToken::new();
        let waiter = {
            let chain = Arc::clone(&chain);
            let cancel = waiter_cancel.clone();
            tokio::spawn(async move { chain.run(FallbackTrigger::Startup, &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        waiter_cancel.cancel();

        let err = tokio::time::timeout(Duration::from_secs(3), waiter)
            .await
            .expect("waiter stayed queued after its own cancellation")
            .unwrap()
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(AuthFailureKind::Cancelled));
        assert_eq!(chain.state(), FallbackState::NeedsInteractiveLogin);
        assert!(!leader.is_finished());
        assert_eq!(chain.completed_attempts(), 0);

        leader_cancel.cancel();
        let err = leader.await.unwrap().unwrap_err();
        assert_eq!(err.failure_kind(), Some(AuthFailureKind::Cancelled));
        assert_eq!(chain.operator.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_wait_expiry_falls_through_to_manual_input() {
        let operator = ScriptedOperator {
            display: true,
            hang_on_confirm: true,
            answers: StdMutex::new(VecDeque::from([token("late")])),
            ..Default::default()
        };
        let chain = chain(ValidationResult::valid(200), operator, true);
        let started = tokio::time::Instant::now();

        let session = chain
            .run(FallbackTrigger::Startup, &CancellationToken::new())
            .await
            .unwrap();
        assert!(started.elapsed() >= chain.options.login_wait);
        assert_eq!(session.bearer_token(), "late");
        assert_eq!(
            chain.history(),
            vec![
                FallbackState::Idle,
                FallbackState::Discovering,
                FallbackState::NeedsInteractiveLogin,
                FallbackState::NeedsManualInput,
                FallbackState::Resolved,
            ]
        );
        assert_eq!(chain.operator.launches.load(Ordering::SeqCst), 1);
        assert_eq!(chain.operator.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_inconclusive_trigger_reports_network() {
        let chain = chain(ValidationResult::valid(200), ScriptedOperator::default(), false);
        let err = chain
            .run(FallbackTrigger::Inconclusive, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(AuthFailureKind::NetworkUnreachable));
    }

    #[test]
    fn test_cookie_file_without_session_cookies() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");
        std::fs::write(&path, ".mubi.com\tTRUE\t/\tTRUE\t0\tlang\ten\n").unwrap();
        assert!(matches!(
            session_from_cookie_file(&path),
            Err(Error::InvalidInput(_))
        ));
    }
}
