//! Batch configuration types and loading

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::BatchError;
use crate::handler::CommandSpec;
use crate::mode::RunMode;

/// Default sleep between runs in seconds
pub const DEFAULT_SLEEP_SECONDS: u64 = 60;

/// File name searched for when no explicit config path is given
pub const CONFIG_FILE_NAME: &str = "batch.yml";

/// Resolved configuration for one batch
///
/// Built once at load time; the runner never re-evaluates defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Batch name (the config section it came from)
    pub name: String,

    /// Identifier of the handler in the registry
    pub handler: String,

    /// Seconds to sleep when the run mode calls for it
    pub sleep_seconds: u64,

    /// Run mode
    pub mode: RunMode,

    /// Ping the liveness sink after every handler run
    pub ping: bool,
}

impl BatchConfig {
    /// Create a config with the default interval and mode-implied ping
    pub fn new(name: impl Into<String>, handler: impl Into<String>, mode: RunMode) -> Self {
        Self {
            name: name.into(),
            handler: handler.into(),
            sleep_seconds: DEFAULT_SLEEP_SECONDS,
            mode,
            ping: resolve_ping(None, mode),
        }
    }

    pub fn with_sleep_seconds(mut self, sleep_seconds: u64) -> Self {
        self.sleep_seconds = sleep_seconds;
        self
    }

    pub fn with_ping(mut self, ping: bool) -> Self {
        self.ping = ping;
        self
    }

    /// Get the sleep interval as a Duration
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_seconds)
    }
}

/// Explicit setting wins, then the mode's default
fn resolve_ping(explicit: Option<bool>, mode: RunMode) -> bool {
    explicit.unwrap_or_else(|| mode.pings_by_default())
}

/// One batch section as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSection {
    /// Handler identifier (required)
    pub handler: String,

    /// Missing or null falls back to [`DEFAULT_SLEEP_SECONDS`]
    #[serde(rename = "sleepSeconds", default, skip_serializing_if = "Option::is_none")]
    pub sleep_seconds: Option<u64>,

    /// Kept as text so an unknown mode reports which batch it belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<bool>,
}

impl BatchSection {
    /// Validate and apply defaults
    pub fn resolve(&self, name: &str) -> Result<BatchConfig, BatchError> {
        debug!(batch = name, "BatchSection::resolve: called");
        let mode = match &self.mode {
            Some(text) => text.parse::<RunMode>().map_err(|_| BatchError::InvalidMode {
                batch: name.to_string(),
                mode: text.clone(),
            })?,
            None => RunMode::default(),
        };

        Ok(BatchConfig {
            name: name.to_string(),
            handler: self.handler.clone(),
            sleep_seconds: self.sleep_seconds.unwrap_or(DEFAULT_SLEEP_SECONDS),
            mode,
            ping: resolve_ping(self.ping, mode),
        })
    }
}

/// Contents of a batch config file
///
/// Every top-level key except `handlers` names a batch section. Sections stay
/// raw YAML until requested, so a broken section only affects its own batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchFile {
    /// Command handlers available to the `bl` binary
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub handlers: BTreeMap<String, CommandSpec>,

    #[serde(flatten)]
    pub batches: BTreeMap<String, serde_yaml::Value>,
}

impl BatchFile {
    /// Load the config file with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self, BatchError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let mut searched = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            searched.push(config_dir.join("batchloop").join(CONFIG_FILE_NAME));
        }

        for path in &searched {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        Err(BatchError::ConfigNotFound { searched })
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| BatchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let file: Self = serde_yaml::from_str(&content).map_err(|source| BatchError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded batch config from: {}", path.display());
        Ok(file)
    }

    /// Resolve the named section into a validated config
    pub fn batch(&self, name: &str) -> Result<BatchConfig, BatchError> {
        let raw = self
            .batches
            .get(name)
            .ok_or_else(|| BatchError::MissingSection { batch: name.to_string() })?;

        let section: BatchSection =
            serde_yaml::from_value(raw.clone()).map_err(|source| BatchError::InvalidSection {
                batch: name.to_string(),
                source,
            })?;
        section.resolve(name)
    }

    /// Names of all configured batches
    pub fn batch_names(&self) -> Vec<&str> {
        self.batches.keys().map(String::as_str).collect()
    }
}
