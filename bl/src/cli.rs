//! CLI argument parsing for bl

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bl")]
#[command(author, version, about = "Run a configured batch job loop", long_about = None)]
pub struct Cli {
    /// Batch section to run
    #[arg(required = true)]
    pub batch: String,

    /// Path to config file (default: ./batch.yml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File rewritten on every liveness ping
    #[arg(long)]
    pub heartbeat: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Shorthand for --log-level DEBUG
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Effective log level directive
    pub fn level(&self) -> String {
        match (&self.log_level, self.verbose) {
            (Some(level), _) => level.to_lowercase(),
            (None, true) => "debug".to_string(),
            (None, false) => "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["bl", "purge"]).unwrap();
        assert_eq!(cli.batch, "purge");
        assert!(cli.config.is_none());
        assert!(cli.heartbeat.is_none());
        assert_eq!(cli.level(), "info");
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "bl",
            "--config",
            "/etc/batch.yml",
            "--heartbeat",
            "/run/bl/alive",
            "-l",
            "WARN",
            "purge",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/batch.yml")));
        assert_eq!(cli.heartbeat, Some(PathBuf::from("/run/bl/alive")));
        assert_eq!(cli.level(), "warn");
    }

    #[test]
    fn test_verbose() {
        let cli = Cli::try_parse_from(["bl", "-v", "purge"]).unwrap();
        assert_eq!(cli.level(), "debug");
    }

    #[test]
    fn test_batch_is_required() {
        assert!(Cli::try_parse_from(["bl"]).is_err());
    }
}
