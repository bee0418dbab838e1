//! Ctrl+C handling.
//!
//! A single `Arc<AtomicBool>` is shared between the signal hook and the
//! scanner. Setting it stops the walk from scheduling new files, drops
//! hashing units that have not started, and makes the scan return
//! [`ScanError::Interrupted`](crate::scanner::ScanError::Interrupted).
//!
//! ```rust,no_run
//! use dupclean::scanner::{ScanConfig, Scanner};
//! use dupclean::signal::install_handler;
//! use std::sync::Arc;
//!
//! let handler = install_handler().expect("signal handler");
//! let scanner = Scanner::new(Arc::new(ScanConfig::new(".")))
//!     .with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request shutdown, as Ctrl+C would.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to hand to a [`Scanner`](crate::scanner::Scanner) or
    /// [`Walker`](crate::scanner::Walker).
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
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

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C hook and return its handler.
///
/// The hook can only be registered once per process. Later calls return the
/// same handler with its flag cleared, so the app can be run repeatedly
/// (as integration tests do).
///
/// # Errors
///
/// Returns [`SignalError`] if the hook cannot be registered and no handler
/// exists yet.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    let installed = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(
            std::io::stderr(),
            "\nInterrupted. Waiting for running hashes to finish..."
        );
        log::info!("Shutdown signal received");
    });

    match installed {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler);
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using an unhooked handler");
            let _ = GLOBAL_HANDLER.set(ShutdownHandler::new());
        }
        Err(e) => return Err(e.into()),
    }

    // Another thread may have won the race to set the global.
    let global = GLOBAL_HANDLER.get().cloned().unwrap_or_default();
    global.reset();
    Ok(global)
}
