//! Human operator interaction for the fallback chain
//!
//! The chain never talks to a terminal directly; it goes through
//! [`Operator`] so headless runs and tests can script the exchange.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{Error, Result};

/// Credentials typed in by the operator
#[derive(Clone, PartialEq, Eq)]
pub enum ManualCredentials {
    /// Path to a Netscape `cookies.txt` export
    CookieFile(PathBuf),
    /// Bearer token plus the two identifiers
    Token {
        token: String,
        user_id: String,
        session_id: String,
    },
    /// Bearer token plus a pasted `dt-custom-data` value
    HeaderValues { token: String, custom_data: String },
}

impl fmt::Debug for ManualCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CookieFile(path) => f.debug_tuple("CookieFile").field(path).finish(),
            Self::Token { user_id, .. } => f
                .debug_struct("Token")
                .field("token", &"[REDACTED]")
                .field("user_id", user_id)
                .field("session_id", &"[REDACTED]")
                .finish(),
            Self::HeaderValues { .. } => f
                .debug_struct("HeaderValues")
                .field("token", &"[REDACTED]")
                .field("custom_data", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Operator-facing side of the fallback chain
#[async_trait]
pub trait Operator: Send + Sync + fmt::Debug {
    /// Whether a browser window can be shown to the operator
    fn display_available(&self) -> bool;

    /// Open the login page in the default browser
    async fn open_login_page(&self, url: &str) -> Result<()>;

    /// Wait until the operator reports the login finished
    ///
    /// `Ok(false)` means the operator chose to skip the browser login.
    async fn confirm_login(&self) -> Result<bool>;

    /// Ask for credentials; `Ok(None)` means the operator gave up
    ///
    /// `problem` explains why the previous attempt was refused.
    async fn request_credentials(
        &self,
        attempt: u32,
        max_attempts: u32,
        problem: Option<&str>,
    ) -> Result<Option<ManualCredentials>>;
}

type InputLines = tokio::io::Lines<Box<dyn AsyncBufRead + Unpin + Send>>;

/// [`Operator`] on a terminal: prompts on stderr, answers from a line reader
pub struct TerminalOperator {
    display_available: bool,
    input: Mutex<InputLines>,
}

impl fmt::Debug for TerminalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalOperator")
            .field("display_available", &self.display_available)
            .finish_non_exhaustive()
    }
}

impl TerminalOperator {
    /// Operator reading answers from standard input
    pub fn stdin(display_available: bool) -> Self {
        Self::with_input(BufReader::new(tokio::io::stdin()), display_available)
    }

    /// Operator reading answers from any line source
    pub fn with_input<R>(reader: R, display_available: bool) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let boxed: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(reader);
        Self {
            display_available,
            input: Mutex::new(boxed.lines()),
        }
    }

    /// Print `prompt` and read one trimmed line; `None` on end of input
    async fn ask(&self, prompt: &str) -> Result<Option<String>> {
        eprint!("{}", prompt);
        let mut input = self.input.lock().await;
        Ok(input.next_line().await?.map(|line| line.trim().to_string()))
    }

    async fn ask_token_credentials(&self) -> Result<Option<ManualCredentials>> {
        let Some(token) = self.ask("Bearer token: ").await?.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let custom = self
            .ask("dt-custom-data value (leave empty to enter ids instead): ")
            .await?
            .unwrap_or_default();
        if !custom.is_empty() {
            return Ok(Some(ManualCredentials::HeaderValues {
                token,
                custom_data: custom,
            }));
        }

        let Some(user_id) = self.ask("User id: ").await? else {
            return Ok(None);
        };
        let Some(session_id) = self.ask("Session id: ").await? else {
            return Ok(None);
        };
        Ok(Some(ManualCredentials::Token {
            token,
            user_id,
            session_id,
        }))
    }
}

#[async_trait]
impl Operator for TerminalOperator {
    fn display_available(&self) -> bool {
        self.display_available
    }

    async fn open_login_page(&self, url: &str) -> Result<()> {
        info!(url, "Opening login page in the default browser");
        let target = url.to_string();
        tokio::task::spawn_blocking(move || open::that(target))
            .await
            .map_err(|e| Error::internal(format!("browser launch task failed: {}", e)))??;
        Ok(())
    }

    async fn confirm_login(&self) -> Result<bool> {
        eprintln!();
        eprintln!("Log in to MUBI in the browser window that just opened.");
        let answer = self
            .ask("Press Enter when done (or type 'skip' to enter credentials manually): ")
            .await?;
        match answer {
            None => Err(Error::cancelled("input closed while waiting for login")),
            Some(answer) => Ok(!answer.eq_ignore_ascii_case("skip")),
        }
    }

    async fn request_credentials(
        &self,
        attempt: u32,
        max_attempts: u32,
        problem: Option<&str>,
    ) -> Result<Option<ManualCredentials>> {
        eprintln!();
        if let Some(problem) = problem {
            eprintln!("Previous credentials were not accepted: {}", problem);
        }
        eprintln!("Manual authentication (attempt {}/{})", attempt, max_attempts);
        eprintln!("  1) Path to a cookies.txt export of mubi.com");
        eprintln!("  2) Bearer token with user and session ids");

        loop {
            let Some(choice) = self.ask("Choice [1/2, empty to cancel]: ").await? else {
                return Ok(None);
            };
            match choice.as_str() {
                "" => return Ok(None),
                "1" => {
                    let path = self.ask("Path to cookies.txt: ").await?.unwrap_or_default();
                    if path.is_empty() {
                        return Ok(None);
                    }
                    debug!("Operator supplied a cookie file");
                    return Ok(Some(ManualCredentials::CookieFile(PathBuf::from(path))));
                }
                "2" => return self.ask_token_credentials().await,
                _ => eprintln!("Please answer 1 or 2."),
            }
        }
    }
}
