//! Liveness sinks

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

/// Receives heartbeats while the batch is alive
pub trait LivenessSink {
    /// Fire and forget
    fn ping(&self);
}

/// Logs each ping at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLiveness;

impl LivenessSink for LogLiveness {
    fn ping(&self) {
        debug!("liveness ping");
    }
}

/// Rewrites a file with the current timestamp on every ping
///
/// Suited to liveness checks that watch the file's modification time.
#[derive(Debug, Clone)]
pub struct HeartbeatFile {
    path: PathBuf,
}

impl HeartbeatFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, Utc::now().to_rfc3339())
    }
}

impl LivenessSink for HeartbeatFile {
    fn ping(&self) {
        match self.write() {
            Ok(()) => debug!(path = ?self.path, "HeartbeatFile::ping: written"),
            Err(e) => warn!(path = ?self.path, error = %e, "Failed to write heartbeat file"),
        }
    }
}
