//! Configuration loading
//!
//! Merges built-in defaults, an optional YAML file and command line
//! overrides into a single Config.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::app::POLL_INTERVAL;

const APP_NAME: &str = "truecount";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Poll interval must be at least one second")]
    ZeroInterval,
}

/// Settings as they appear in the YAML file
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Seconds between polls
    pub interval_secs: Option<u64>,
    /// Tracing filter directive, e.g. `debug` or `truecount=trace`
    pub log_level: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Repository directory to monitor
    pub path: PathBuf,
    pub interval: Duration,
    pub log_level: String,
}

impl Config {
    /// Layer command line values over the file config
    pub fn resolve(
        path: PathBuf,
        interval_secs: Option<u64>,
        file: FileConfig,
    ) -> Result<Self, ConfigError> {
        let interval = match interval_secs.or(file.interval_secs) {
            Some(0) => return Err(ConfigError::ZeroInterval),
            Some(secs) => Duration::from_secs(secs),
            None => POLL_INTERVAL,
        };

        Ok(Self {
            path,
            interval,
            log_level: file
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

/// Location of the per-user config file, if the platform has one
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Load a config file the user asked for explicitly
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &contents)
}

/// Load the per-user config file, treating a missing file as empty
pub fn load_default() -> Result<FileConfig, ConfigError> {
    match default_config_path() {
        Some(path) => load_optional(&path),
        None => Ok(FileConfig::default()),
    }
}

fn load_optional(path: &Path) -> Result<FileConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => parse(path, &contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse(path: &Path, contents: &str) -> Result<FileConfig, ConfigError> {
    // An empty YAML document deserializes as unit, not a map
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
