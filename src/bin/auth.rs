//! Session authentication binary
//!
//! Finds a MUBI login in the local browsers and reports or prints the
//! request headers derived from it.
//!
//! # Usage
//!
//! ```bash
//! mubi-auth --detect-only
//! mubi-auth --browser firefox --print-headers
//! mubi-auth --watch
//! ```
//!
//! Exits with status 1 when every authentication route failed, printing the
//! remedy for the failure on stderr.

use clap::Parser;
use std::process::ExitCode;

use mubi_session::cli::{AuthArgs, run_auth};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = AuthArgs::parse();
    run_auth(args).await
}
