//! Type definitions for session authentication
//!
//! This module contains the data model shared by the detector, the store
//! reader and the session components.

pub mod cookies;
pub mod platform;
pub mod serde_helpers;
pub mod session;

pub use cookies::{CookieLayout, RawCookieSet};
pub use platform::{Browser, CredentialLocation, LocationKind, Platform};
pub use session::{HeaderSet, Session, ValidationOutcome, ValidationResult};
