//! Command-line entry points
//!
//! Logic behind the `mubi-auth` binary, kept in the library so it can be
//! tested without spawning a process.

pub mod auth;

pub use auth::{AuthArgs, run_auth};
