//! `mubi-auth` command logic
//!
//! Detects the environment, authenticates through the fallback chain and
//! either reports the result or prints the request headers. With `--watch`
//! it keeps the heartbeat running until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ConfigLoader;
use crate::environment::EnvironmentDetector;
use crate::types::Browser;
use crate::utils::version;
use crate::{AuthManager, Error, Settings};

/// Exit status after Ctrl-C, as shells report SIGINT
const EXIT_INTERRUPTED: u8 = 130;

/// Authenticate against MUBI using an existing browser session
#[derive(Debug, Parser)]
#[command(name = "mubi-auth", author, version, about, long_about = None)]
pub struct AuthArgs {
    /// Only read cookies from this browser (chrome, firefox, edge)
    #[arg(short, long, value_name = "BROWSER")]
    pub browser: Option<Browser>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Two-letter country code sent with API requests
    #[arg(long, value_name = "CODE")]
    pub country: Option<String>,

    /// Never prompt; fail instead of asking for a login
    #[arg(long)]
    pub no_interactive: bool,

    /// Print the detected platform and cookie stores as JSON and exit
    #[arg(long)]
    pub detect_only: bool,

    /// Print the request headers on stdout
    #[arg(long, conflicts_with = "detect_only")]
    pub print_headers: bool,

    /// Keep validating the session until Ctrl-C
    #[arg(short, long, conflicts_with = "detect_only")]
    pub watch: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl AuthArgs {
    /// Apply command-line overrides on top of loaded settings
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(browser) = self.browser {
            settings.auth.browser = Some(browser);
        }
        if let Some(ref country) = self.country {
            settings.auth.country = country.trim().to_ascii_uppercase();
        }
        if self.no_interactive {
            settings.interactive.prompts_enabled = false;
        }
        if self.verbose {
            settings.logging.verbose = true;
        }
    }
}

/// Default log filter when `RUST_LOG` is unset
fn default_filter(settings: &Settings) -> String {
    if settings.logging.verbose {
        "debug".to_string()
    } else {
        settings.logging.level.clone()
    }
}

fn init_logging(settings: &Settings) {
    let fallback = default_filter(settings);
    // Logs share the terminal with prompts; stdout stays clean for output
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Run `mubi-auth` with parsed arguments
pub async fn run_auth(args: AuthArgs) -> Result<ExitCode> {
    let mut settings = ConfigLoader::new()
        .load(args.config.as_deref())
        .context("failed to load configuration")?;
    args.apply(&mut settings);
    settings.validate().context("invalid command-line override")?;
    init_logging(&settings);

    info!("mubi-auth v{}", version::get_version());

    let detection = EnvironmentDetector::from_host().detect(&settings.browser_order());
    debug!(
        platform = %detection.platform,
        candidates = detection.candidates.len(),
        display = detection.display_available,
        "Environment detected"
    );

    if args.detect_only {
        println!("{}", serde_json::to_string_pretty(&detection)?);
        return Ok(ExitCode::SUCCESS);
    }

    let manager = Arc::new(AuthManager::new(settings, &detection)?);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let headers = match manager.ensure_authenticated_with(&cancel).await {
        Ok(headers) => headers,
        Err(e) if cancel.is_cancelled() => {
            debug!(error = %e, "Interrupted");
            eprintln!("Interrupted.");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
        Err(e @ Error::AuthExhausted { .. }) => {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if args.print_headers {
        for (name, value) in headers.pairs() {
            println!("{}: {}", name, value);
        }
    } else if let Some(session) = manager.cache().current().await {
        eprintln!("Authenticated as MUBI user {}", session.user_id());
    }

    if args.watch {
        watch(&manager, cancel).await;
    }

    Ok(ExitCode::SUCCESS)
}

/// Heartbeat in the foreground, reporting fallback state changes
async fn watch(manager: &Arc<AuthManager>, shutdown: CancellationToken) {
    let heartbeat = manager.spawn_heartbeat(shutdown.clone());
    let mut states = manager.fallback().subscribe();
    eprintln!("Watching session; press Ctrl-C to stop.");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                eprintln!("Authentication state: {}", state);
            }
        }
    }

    if let Err(e) = heartbeat.await {
        debug!(error = %e, "Heartbeat task ended abnormally");
    }
}
