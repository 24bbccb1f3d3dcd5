//! Runtime configuration for the extraction engine
//!
//! Configuration is resolved from environment variables with sensible
//! defaults that match the layout of a monitoring playbook checkout:
//!
//! - `CHECKDOC_TEMPLATES_DIR`: templates directory relative to the root
//!   (default: `playbooks/templates/rax-maas`)
//! - `CHECKDOC_VARS_DIR`: variable files directory relative to the root
//!   (default: `playbooks/vars`)
//! - `CHECKDOC_LOG_LEVEL`: logging level (default: `info`)

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_TEMPLATES_DIR: &str = "playbooks/templates/rax-maas";
pub const DEFAULT_VARS_DIR: &str = "playbooks/vars";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct CheckdocConfig {
    /// Root of the playbook checkout to document
    pub root: PathBuf,
    /// Templates directory, relative to the root
    pub templates_dir: PathBuf,
    /// Variable files directory, relative to the root
    pub vars_dir: PathBuf,
    /// Logging level
    pub log_level: String,
}

impl Default for CheckdocConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            templates_dir: std::env::var("CHECKDOC_TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMPLATES_DIR)),
            vars_dir: std::env::var("CHECKDOC_VARS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_VARS_DIR)),
            log_level: std::env::var("CHECKDOC_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl CheckdocConfig {
    /// Configuration for a given checkout root with default directory layout
    pub fn for_root(root: PathBuf) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Absolute path to the templates directory
    pub fn templates_path(&self) -> PathBuf {
        self.root.join(&self.templates_dir)
    }

    /// Absolute path to the variable files directory
    pub fn vars_path(&self) -> PathBuf {
        self.root.join(&self.vars_dir)
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "templates directory must not be empty".to_string(),
            ));
        }
        if self.vars_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "vars directory must not be empty".to_string(),
            ));
        }
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "unknown log level '{other}'"
            ))),
        }
    }
}

impl fmt::Display for CheckdocConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "root={} templates={} vars={} log_level={}",
            self.root.display(),
            self.templates_dir.display(),
            self.vars_dir.display(),
            self.log_level
        )
    }
}
