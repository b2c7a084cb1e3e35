//! Background session heartbeat
//!
//! Re-validates the cached session on a fixed interval. A refusal clears the
//! cache and runs the fallback chain once; inconclusive checks only escalate
//! after a bounded number in a row. The refused session is never retried.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::fallback::FallbackTrigger;
use super::manager::AuthManagerGeneric;
use super::operator::Operator;
use super::validator::StatusValidator;
use crate::types::{Session, ValidationOutcome};

/// What a single heartbeat check did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatEvent {
    /// Nothing cached; waits for a new external trigger
    NoSession,
    Valid,
    /// Inconclusive check below the escalation threshold
    Inconclusive { consecutive: u32 },
    /// The fallback chain produced a new session
    Recovered { trigger: FallbackTrigger },
    /// The fallback chain gave up
    Exhausted { trigger: FallbackTrigger },
}

/// Periodic validation of the cached session
#[derive(Debug)]
pub struct Heartbeat<V, O> {
    manager: Arc<AuthManagerGeneric<V, O>>,
    interval: Duration,
    max_inconclusive: u32,
    consecutive_inconclusive: u32,
}

impl<V, O> Heartbeat<V, O>
where
    V: StatusValidator + 'static,
    O: Operator + 'static,
{
    pub fn new(manager: Arc<AuthManagerGeneric<V, O>>) -> Self {
        let validation = &manager.settings().validation;
        let interval = validation.heartbeat_interval();
        let max_inconclusive = validation.max_inconclusive.max(1);
        Self {
            manager,
            interval,
            max_inconclusive,
            consecutive_inconclusive: 0,
        }
    }

    /// Check every interval until `shutdown` is cancelled
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Session heartbeat started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.cancelled() => {
                    info!("Session heartbeat stopped");
                    return;
                }
            }
            let event = self.tick(&shutdown).await;
            debug!(?event, "Heartbeat check finished");
        }
    }

    /// Run one check
    pub async fn tick(&mut self, shutdown: &CancellationToken) -> HeartbeatEvent {
        let Some(session) = self.manager.cache.current().await else {
            return HeartbeatEvent::NoSession;
        };

        let result = self.manager.validator.validate(&session).await;
        match &result.outcome {
            ValidationOutcome::Valid => {
                self.consecutive_inconclusive = 0;
                self.manager.cache.record_validation(&session, result).await;
                HeartbeatEvent::Valid
            }
            ValidationOutcome::Inconclusive { reason } => {
                self.consecutive_inconclusive += 1;
                warn!(
                    reason = %reason,
                    consecutive = self.consecutive_inconclusive,
                    limit = self.max_inconclusive,
                    "Heartbeat check inconclusive"
                );
                self.manager.cache.record_validation(&session, result).await;
                if self.consecutive_inconclusive >= self.max_inconclusive {
                    self.escalate(FallbackTrigger::Inconclusive, &session, shutdown)
                        .await
                } else {
                    HeartbeatEvent::Inconclusive {
                        consecutive: self.consecutive_inconclusive,
                    }
                }
            }
            outcome => {
                info!(%outcome, "Heartbeat found the session refused");
                self.manager.cache.clear_if_current(&session).await;
                self.escalate(FallbackTrigger::Rejected, &session, shutdown)
                    .await
            }
        }
    }

    async fn escalate(
        &mut self,
        trigger: FallbackTrigger,
        session: &Arc<Session>,
        shutdown: &CancellationToken,
    ) -> HeartbeatEvent {
        self.consecutive_inconclusive = 0;
        match self.manager.chain.run(trigger, shutdown).await {
            Ok(resolved) => {
                if Arc::ptr_eq(&resolved, session) {
                    debug!("Fallback kept the current session");
                }
                HeartbeatEvent::Recovered { trigger }
            }
            Err(e) => {
                warn!(error = %e, "Heartbeat could not re-authenticate");
                HeartbeatEvent::Exhausted { trigger }
            }
        }
    }
}
