//! BatchLoop - batch job run loop
//!
//! Repeatedly invokes a named task handler under a run mode, sleeping between
//! runs in interruptible slices, pinging a liveness sink and stopping on a
//! termination request or when the handler has no more work.
//!
//! # Run modes
//!
//! | mode            | handler asks rerun | handler done     |
//! |-----------------|--------------------|------------------|
//! | `continuous`    | run again now      | sleep, run again |
//! | `once`          | stop               | stop             |
//! | `complete`      | run again now      | stop             |
//! | `complete-slow` | sleep, run again   | stop             |
//!
//! # Example
//!
//! ```ignore
//! use batchloop::{BatchFile, BatchRunner, HandlerRegistry, LogLiveness, TermFlag};
//!
//! let file = BatchFile::load(None)?;
//! let mut registry = HandlerRegistry::new();
//! registry.register("purge-expired", || PurgeExpired::connect());
//! let runner = BatchRunner::new(file.batch("purge")?, registry)?;
//! runner.run(&TermFlag::new(), &LogLiveness)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod liveness;
pub mod mode;
pub mod runner;
pub mod signal;
pub mod sleeper;

pub use config::{BatchConfig, BatchFile, BatchSection, DEFAULT_SLEEP_SECONDS};
pub use error::BatchError;
pub use handler::{CommandHandler, CommandSpec, HandlerRegistry, TaskHandler};
pub use liveness::{HeartbeatFile, LivenessSink, LogLiveness};
pub use mode::{Decision, RunMode};
pub use runner::{BatchRunner, RunSummary, StopReason};
pub use signal::{SignalSource, TermFlag, install_termination_watcher};
pub use sleeper::{PING_EVERY_SLICES, Pause, SLICE_SECS, SleepOutcome, Sleeper, ThreadPause};
