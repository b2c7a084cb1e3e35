//! Error handling for session authentication
//!
//! This module defines error types and handling patterns used throughout the crate.

pub mod types;

pub use types::{AuthFailureKind, Error, Result};
