//! bl - run a configured batch job loop
//!
//! Loads the named batch from the config file, wires its command handler and
//! runs the loop until it completes or the process is asked to terminate.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use batchloop::cli::Cli;
use batchloop::{
    BatchFile, BatchRunner, HandlerRegistry, HeartbeatFile, LivenessSink, LogLiveness, TermFlag,
    install_termination_watcher,
};

fn setup_logging(level: &str) -> Result<()> {
    let directive: Directive = level.parse().context("Invalid log level")?;

    // Logs go to stderr so stdout stays free for the summary line
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.level()).context("Failed to setup logging")?;

    let file = BatchFile::load(cli.config.as_ref()).context("Failed to load batch config")?;
    let config = file.batch(&cli.batch)?;
    let registry = HandlerRegistry::from_commands(&file.handlers);
    let runner = BatchRunner::new(config, registry)?;
    let name = runner.config().name.clone();

    let flag = TermFlag::new();
    let watcher = match install_termination_watcher(flag.clone()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Failed to install signal handlers; graceful shutdown disabled");
            None
        }
    };

    let liveness: Box<dyn LivenessSink + Send> = match cli.heartbeat {
        Some(path) => {
            let heartbeat = HeartbeatFile::new(path);
            info!(path = ?heartbeat.path(), "Heartbeat file enabled");
            Box::new(heartbeat)
        }
        None => Box::new(LogLiveness),
    };

    let summary = tokio::task::spawn_blocking(move || runner.run(&flag, liveness.as_ref()))
        .await
        .context("Batch runner panicked")??;
    if let Some(watcher) = watcher {
        watcher.abort();
    }

    println!(
        "{} batch {} {} after {} run(s)",
        "✓".green(),
        name.cyan(),
        summary.stop,
        summary.iterations
    );
    Ok(())
}
