//! Configuration loading and parsing.
//!
//! Parses `tern.toml` (or an override path provided on the command line).
//! Only binary-level concerns live here: where the log goes, the default
//! filter, and the window title. Engine behavior (tab stop, scroll margin,
//! allocation slack) is fixed by constants, not configuration. Unknown
//! fields are ignored so the format can grow without breaking old files.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "Config::default_log_file")]
    pub log_file: PathBuf,
    /// Default tracing filter; the `RUST_LOG` environment variable wins.
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default = "Config::default_title")]
    pub title: String,
}

impl Config {
    fn default_log_file() -> PathBuf {
        PathBuf::from("tern.log")
    }

    fn default_log_filter() -> String {
        "info".to_string()
    }

    fn default_title() -> String {
        "tern".to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: Self::default_log_file(),
            log_filter: Self::default_log_filter(),
            title: Self::default_title(),
        }
    }
}

fn discover() -> PathBuf {
    PathBuf::from("tern.toml")
}

/// Load from `path`, or from the discovered `tern.toml`. A missing or
/// unparsable file falls back to defaults; startup never fails over
/// configuration.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<Config>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(target: "config", file = %path.display(), %e, "config_parse_error");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}
