//! Run configuration.
//!
//! A [`Config`] comes from an optional JSON file; every field has a default
//! so a partial file (or none at all) is valid. Command-line flags are
//! applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Log filter used when debug output is requested.
pub const DEBUG_LOG_FILTER: &str = "debug";

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
    /// Human-readable single line output.
    #[default]
    Compact,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Settings for one run of the validator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fact documents merged into the repository, in order.
    pub facts: Vec<PathBuf>,
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// `tracing` filter directive, e.g. `info` or `plugininfo_core=debug`.
    pub log_filter: String,
    /// Output format of log lines on stderr.
    pub log_format: LogFormat,
    /// Worker threads for batch descriptions; unset uses one per core.
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facts: Vec::new(),
            pretty: false,
            log_filter: default_log_filter(),
            log_format: LogFormat::default(),
            jobs: None,
        }
    }
}

impl Config {
    /// Reads a configuration file. Relative fact paths are resolved against
    /// the directory holding the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        let mut config: Config = serde_json::from_str(&content)
            .context(format!("Failed to parse config file: {:?}", path))?;

        if let Some(base) = path.parent() {
            config.facts = config
                .facts
                .into_iter()
                .map(|facts| if facts.is_relative() { base.join(facts) } else { facts })
                .collect();
        }
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
