//! Task handlers and the registry the runner resolves them from

use std::collections::BTreeMap;
use std::process::{Command, ExitStatus};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One unit of batch work
pub trait TaskHandler {
    /// Do the work once; `Ok(true)` asks for a rerun
    fn run(&mut self) -> Result<bool>;
}

impl<F> TaskHandler for F
where
    F: FnMut() -> Result<bool>,
{
    fn run(&mut self) -> Result<bool> {
        self()
    }
}

type Factory = Box<dyn Fn() -> Box<dyn TaskHandler> + Send + Sync>;

/// Handler factories keyed by identifier
///
/// Every lookup builds a fresh handler, so state is re-resolved per run.
#[derive(Default)]
pub struct HandlerRegistry {
    factories: BTreeMap<String, Factory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F, H>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: TaskHandler + 'static,
    {
        let name = name.into();
        debug!(%name, "HandlerRegistry::register: called");
        self.factories
            .insert(name, Box::new(move || Box::new(factory()) as Box<dyn TaskHandler>));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build a fresh handler
    pub fn resolve(&self, name: &str) -> Option<Box<dyn TaskHandler>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Registry of shell command handlers
    pub fn from_commands(specs: &BTreeMap<String, CommandSpec>) -> Self {
        let mut registry = Self::new();
        for (name, spec) in specs {
            let spec = spec.clone();
            registry.register(name.clone(), move || CommandHandler::new(spec.clone()));
        }
        registry
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry").field("handlers", &self.names()).finish()
    }
}

fn default_rerun_exit_code() -> i32 {
    75
}

/// Shell command handler declared in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Command line, run with `sh -c`
    pub command: String,

    /// Exit status that asks for a rerun
    #[serde(rename = "rerun-exit-code", default = "default_rerun_exit_code")]
    pub rerun_exit_code: i32,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            rerun_exit_code: default_rerun_exit_code(),
        }
    }
}

/// Runs a shell command; exit 0 means done, the rerun code means run again
#[derive(Debug, Clone)]
pub struct CommandHandler {
    spec: CommandSpec,
}

impl CommandHandler {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

impl TaskHandler for CommandHandler {
    fn run(&mut self) -> Result<bool> {
        debug!(command = %self.spec.command, "CommandHandler::run: called");
        let status = Command::new("sh")
            .arg("-c")
            .arg(&self.spec.command)
            .status()
            .with_context(|| format!("Failed to spawn `{}`", self.spec.command))?;

        if killed_by_termination(&status) {
            debug!(command = %self.spec.command, %status, "CommandHandler::run: stopped by termination signal");
            return Ok(false);
        }

        match status.code() {
            Some(0) => Ok(false),
            Some(code) if code == self.spec.rerun_exit_code => Ok(true),
            _ => Err(eyre::eyre!("`{}` failed: {}", self.spec.command, status)),
        }
    }
}

/// Child died from the same signals that ask the batch to shut down
///
/// Ctrl+C and group-wide stops reach the child too; the runner's next
/// termination check takes it from there.
#[cfg(unix)]
fn killed_by_termination(status: &ExitStatus) -> bool {
    use nix::sys::signal::Signal;
    use std::os::unix::process::ExitStatusExt;

    status
        .signal()
        .and_then(|raw| Signal::try_from(raw).ok())
        .is_some_and(|signal| matches!(signal, Signal::SIGINT | Signal::SIGTERM | Signal::SIGQUIT))
}

#[cfg(not(unix))]
fn killed_by_termination(_status: &ExitStatus) -> bool {
    false
}
