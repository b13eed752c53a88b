//! Cooperative cancellation and Ctrl+C handling.
//!
//! A [`CancelToken`] wraps an `AtomicBool` that the walker checks before
//! every node and the accelerator workers check before every job. The binary
//! installs a Ctrl+C handler that trips a process-wide token; library users
//! and tests create unhooked tokens with [`CancelToken::new`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use rustwalk::signal::install_handler;
//!
//! let token = install_handler().expect("Failed to install signal handler");
//! if token.is_cancelled() {
//!     println!("Cancelled, saving state...");
//! }
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption.
/// This follows Unix convention: 128 + signal number (SIGINT = 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared cancellation flag.
///
/// Clones observe the same flag, so a token handed to a session can be
/// tripped from any thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_TOKEN: OnceLock<CancelToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// Calling this more than once returns the already installed token (reset).
/// If another handler was registered elsewhere in the process, an unhooked
/// token is returned instead so callers can still cancel manually.
pub fn install_handler() -> Result<CancelToken, SignalError> {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancelToken::new();
    let hooked = token.clone();

    match ctrlc::set_handler(move || {
        hooked.cancel();
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Stopping walk...");
        let _ = std::io::stderr().flush();
        log::info!("Cancellation signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(token)
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked token");
            let fallback = CancelToken::new();
            let _ = GLOBAL_TOKEN.set(fallback.clone());
            Ok(fallback)
        }
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
