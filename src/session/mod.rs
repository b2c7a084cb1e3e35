//! Session derivation, validation and recovery
//!
//! This module turns raw cookies into a [`Session`](crate::types::Session),
//! checks it against the MUBI API, keeps it in the in-memory cache, and runs
//! the fallback chain when no usable session is left.

pub mod cache;
pub mod derivation;
pub mod fallback;
pub mod manager;
pub mod monitor;
pub mod operator;
pub mod validator;

pub use cache::{CachedSession, CredentialCache};
pub use derivation::{derive, headers};
pub use fallback::{FallbackChain, FallbackOptions, FallbackState, FallbackTrigger};
pub use manager::{AuthManager, AuthManagerGeneric, CurrentHeaders};
pub use monitor::{Heartbeat, HeartbeatEvent};
pub use operator::{ManualCredentials, Operator, TerminalOperator};
pub use validator::{HttpStatusValidator, StatusValidator, classify};
