//! BatchRunner - drives the handler according to the run mode
//!
//! ```text
//! loop {
//!   ├─► termination requested? ─► stop (signal)
//!   ├─► resolve handler, run it
//!   ├─► ping (if enabled)
//!   └─► mode.decide(rerun)
//!         ├─ Stop            ─► stop (once / completed)
//!         ├─ RerunImmediate  ─► next iteration
//!         └─ RerunAfterSleep ─► sliced sleep, next iteration
//! }
//! ```

use eyre::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::handler::HandlerRegistry;
use crate::liveness::LivenessSink;
use crate::mode::{Decision, RunMode};
use crate::signal::SignalSource;
use crate::sleeper::{Pause, Sleeper};

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Termination was requested
    Signal,
    /// `once` mode ran its single iteration
    Once,
    /// The handler had no more work
    Completed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signal => write!(f, "terminated"),
            Self::Once => write!(f, "ran once"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Result of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Handler invocations
    pub iterations: u64,
    pub stop: StopReason,
}

/// Batch run loop
#[derive(Debug)]
pub struct BatchRunner {
    config: BatchConfig,
    registry: HandlerRegistry,
    sleeper: Sleeper,
}

impl BatchRunner {
    /// Create a runner, failing if the handler is not registered
    pub fn new(config: BatchConfig, registry: HandlerRegistry) -> Result<Self, BatchError> {
        debug!(batch = %config.name, handler = %config.handler, "BatchRunner::new: called");
        if !registry.contains(&config.handler) {
            return Err(BatchError::UnknownHandler {
                batch: config.name.clone(),
                handler: config.handler.clone(),
            });
        }

        Ok(Self {
            config,
            registry,
            sleeper: Sleeper::default(),
        })
    }

    /// Replace the blocking wait used between runs
    pub fn with_pause(mut self, pause: impl Pause + 'static) -> Self {
        self.sleeper = Sleeper::new(pause);
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run until termination is requested or the mode says stop
    ///
    /// Handler errors end the loop and are returned as-is with context, unless
    /// termination was requested meanwhile; then the run stops gracefully.
    pub fn run(&self, signals: &dyn SignalSource, liveness: &dyn LivenessSink) -> Result<RunSummary> {
        let name = &self.config.name;
        let mode = self.config.mode;

        info!(batch = %name, %mode, "Batch {} started, mode={}", name, mode);
        if mode.sleeps() {
            info!(batch = %name, "Sleep interval: {} seconds", self.config.sleep_seconds);
        }

        let mut iterations: u64 = 0;
        loop {
            if signals.termination_requested() {
                info!(batch = %name, iterations, "Performing graceful shutdown on termination request");
                return Ok(self.summary(iterations, StopReason::Signal));
            }

            let mut handler = self.registry.resolve(&self.config.handler).ok_or_else(|| BatchError::UnknownHandler {
                batch: name.clone(),
                handler: self.config.handler.clone(),
            })?;

            let result = handler.run();
            iterations += 1;

            let rerun = match result {
                Ok(rerun) => rerun,
                // The handler was most likely taken down by the same shutdown request
                Err(e) if signals.termination_requested() => {
                    warn!(batch = %name, error = %e, "Handler failed during shutdown");
                    info!(batch = %name, iterations, "Performing graceful shutdown on termination request");
                    return Ok(self.summary(iterations, StopReason::Signal));
                }
                Err(e) => {
                    return Err(e).wrap_err_with(|| format!("batch {} handler {} failed", name, self.config.handler));
                }
            };

            if self.config.ping {
                liveness.ping();
            }

            let decision = mode.decide(rerun);
            debug!(batch = %name, iterations, rerun, ?decision, "BatchRunner::run: iteration done");

            match decision {
                Decision::Stop => {
                    let stop = if mode == RunMode::Once {
                        StopReason::Once
                    } else {
                        StopReason::Completed
                    };
                    return Ok(self.summary(iterations, stop));
                }
                Decision::RerunImmediate => continue,
                Decision::RerunAfterSleep => {
                    let outcome = self.sleeper.sleep(self.config.sleep_seconds, signals, liveness);
                    debug!(batch = %name, ?outcome, "BatchRunner::run: slept");
                }
            }
        }
    }

    fn summary(&self, iterations: u64, stop: StopReason) -> RunSummary {
        let summary = RunSummary { iterations, stop };
        debug!(batch = %self.config.name, ?summary, "BatchRunner::run: finished");
        summary
    }
}
