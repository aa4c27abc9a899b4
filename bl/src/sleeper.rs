//! Interruptible sleep between batch runs
//!
//! Long sleeps are cut into fixed slices. Before each full slice the signal
//! source is checked, and every [`PING_EVERY_SLICES`] slices the liveness sink
//! is pinged so the process stays marked alive while idle. The last short
//! slice is slept without a further check.
//!
//! ```text
//! sleep(95): [check] 10s ×4 → ping → [check] 10s ×4 → ping → [check] 10s → 5s
//! ```
//!
//! Elapsed wall-clock time is not tracked: every slice sleeps its nominal
//! length, so time spent in checks and pings adds to the total.

use std::time::Duration;

use tracing::debug;

use crate::liveness::LivenessSink;
use crate::signal::SignalSource;

/// Length of one sleep slice in seconds
pub const SLICE_SECS: u64 = 10;

/// Full slices between idle pings
pub const PING_EVERY_SLICES: u32 = 4;

/// Blocking wait used by the sleeper
pub trait Pause: Send + Sync {
    fn pause(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How a sleep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    Completed,
    Interrupted,
}

/// Sleeps in slices, pinging and watching for termination
pub struct Sleeper {
    pause: Box<dyn Pause>,
}

impl Default for Sleeper {
    fn default() -> Self {
        Self::new(ThreadPause)
    }
}

impl Sleeper {
    pub fn new(pause: impl Pause + 'static) -> Self {
        Self { pause: Box::new(pause) }
    }

    /// Sleep `total_secs`, returning early once termination is requested
    ///
    /// Idle pings fire regardless of the batch's ping setting.
    pub fn sleep(&self, total_secs: u64, signals: &dyn SignalSource, liveness: &dyn LivenessSink) -> SleepOutcome {
        debug!(total_secs, "Sleeper::sleep: called");
        let mut remaining = total_secs;
        let mut slices: u32 = 0;

        while remaining > SLICE_SECS {
            if signals.termination_requested() {
                debug!(slices, remaining, "Sleeper::sleep: interrupted");
                return SleepOutcome::Interrupted;
            }
            self.pause.pause(Duration::from_secs(SLICE_SECS));
            remaining -= SLICE_SECS;
            slices += 1;
            if slices % PING_EVERY_SLICES == 0 {
                liveness.ping();
            }
        }

        if remaining > 0 {
            self.pause.pause(Duration::from_secs(remaining));
        }
        SleepOutcome::Completed
    }
}

impl std::fmt::Debug for Sleeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sleeper").finish_non_exhaustive()
    }
}
