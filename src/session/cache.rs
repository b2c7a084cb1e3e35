//! Process-lifetime credential cache
//!
//! Holds the one live [`Session`] and the last validation result recorded
//! against it. Readers get an `Arc` snapshot; a replacement swaps the whole
//! slot under the write lock, so a half-built session is never observable.
//! Apart from [`CredentialCache::replace`], only the session module writes to it.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{Session, ValidationResult};

#[derive(Debug, Default)]
struct CacheSlot {
    session: Option<Arc<Session>>,
    last_validation: Option<ValidationResult>,
}

/// Snapshot of the cached session and its most recent check
#[derive(Debug, Clone)]
pub struct CachedSession {
    pub session: Arc<Session>,
    pub last_validation: Option<ValidationResult>,
}

/// In-memory holder of the last-known-good session
#[derive(Debug, Default)]
pub struct CredentialCache {
    slot: RwLock<CacheSlot>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached session, if any
    pub async fn current(&self) -> Option<Arc<Session>> {
        self.slot.read().await.session.clone()
    }

    /// The cached session together with its last validation result
    pub async fn snapshot(&self) -> Option<CachedSession> {
        let slot = self.slot.read().await;
        slot.session.as_ref().map(|session| CachedSession {
            session: Arc::clone(session),
            last_validation: slot.last_validation.clone(),
        })
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.session.is_none()
    }

    /// Publish a session obtained outside the fallback chain
    ///
    /// Drops the previous session and its validation; the heartbeat checks
    /// the new one on its next tick.
    pub async fn replace(&self, session: Session) -> Arc<Session> {
        self.store(session, None).await
    }

    /// Publish a session together with the check that confirmed it
    pub(crate) async fn replace_validated(
        &self,
        session: Session,
        result: ValidationResult,
    ) -> Arc<Session> {
        self.store(session, Some(result)).await
    }

    async fn store(&self, session: Session, result: Option<ValidationResult>) -> Arc<Session> {
        let session = Arc::new(session);
        let mut slot = self.slot.write().await;
        slot.session = Some(Arc::clone(&session));
        slot.last_validation = result;
        debug!("Credential cache replaced");
        session
    }

    /// Drop whatever session is cached
    pub(crate) async fn clear(&self) {
        let mut slot = self.slot.write().await;
        if slot.session.take().is_some() {
            debug!("Credential cache cleared");
        }
        slot.last_validation = None;
    }

    /// Drop the cached session only if it is still `session`
    pub(crate) async fn clear_if_current(&self, session: &Arc<Session>) -> bool {
        let mut slot = self.slot.write().await;
        let same = slot
            .session
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, session));
        if same {
            slot.session = None;
            slot.last_validation = None;
            debug!("Credential cache cleared");
        }
        same
    }

    /// Record a validation result if `session` is still the cached one
    pub(crate) async fn record_validation(
        &self,
        session: &Arc<Session>,
        result: ValidationResult,
    ) -> bool {
        let mut slot = self.slot.write().await;
        let same = slot
            .session
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, session));
        if same {
            slot.last_validation = Some(result);
        }
        same
    }
}
