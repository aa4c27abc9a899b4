//! Termination signal source
//!
//! The runner only polls [`SignalSource::termination_requested`]. The process
//! binds OS signals to a [`TermFlag`] with [`install_termination_watcher`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Pollable "termination requested" state
pub trait SignalSource {
    /// Non-blocking and free of side effects
    fn termination_requested(&self) -> bool;
}

impl SignalSource for AtomicBool {
    fn termination_requested(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

/// Shared termination flag, set once and never cleared
#[derive(Debug, Clone, Default)]
pub struct TermFlag(Arc<AtomicBool>);

impl TermFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination
    pub fn request(&self) {
        debug!("TermFlag::request: called");
        self.0.store(true, Ordering::SeqCst);
    }
}

impl SignalSource for TermFlag {
    fn termination_requested(&self) -> bool {
        self.0.termination_requested()
    }
}

/// Register SIGINT, SIGTERM and SIGQUIT, then set the flag on the first one
///
/// Registration happens before this returns, so a failure is reported to the
/// caller instead of silently leaving the batch without graceful shutdown.
/// Must be called inside a tokio runtime.
#[cfg(unix)]
pub fn install_termination_watcher(flag: TermFlag) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;
    debug!("install_termination_watcher: signal handlers registered");

    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
            _ = sigquit.recv() => warn!("SIGQUIT received"),
        }
        flag.request();
    }))
}

/// Wait for Ctrl+C and set the flag
#[cfg(not(unix))]
pub fn install_termination_watcher(flag: TermFlag) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Ctrl+C received");
                flag.request();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C; graceful shutdown disabled"),
        }
    }))
}
