//! Optional TOML settings file.
//!
//! ```toml
//! [defaults]
//! lines = 20
//! quiet = false
//! continue_on_error = true
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! Every key is optional. Command-line flags override anything read here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::LimitFlags;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: DefaultsSection,
    pub logging: LoggingSection,
}

/// Default run settings; each maps onto a command-line flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    pub lines: u64,
    pub bytes: u64,
    pub quiet: bool,
    pub verbose: bool,
    pub continue_on_error: bool,
    pub blank_between: bool,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            lines: 0,
            bytes: 0,
            quiet: false,
            verbose: false,
            continue_on_error: true,
            blank_between: true,
        }
    }
}

impl DefaultsSection {
    pub const fn limit_flags(&self) -> LimitFlags {
        LimitFlags {
            lines: self.lines,
            bytes: self.bytes,
            quiet: self.quiet,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Parse settings from TOML text.
pub fn parse_config(text: &str, origin: &Path) -> Result<AppConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })
}

/// Load settings from `path`, or return built-in defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text, path)
}
