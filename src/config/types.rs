//! Configuration type definitions

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::loader::{self, ConfigError, ConfigWarning};

/// Names of the files written next to the copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    #[serde(default = "default_summary_name")]
    pub summary_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            manifest_name: default_manifest_name(),
            summary_name: default_summary_name(),
        }
    }
}

fn default_manifest_name() -> String {
    "FILES.csv".to_string()
}

fn default_summary_name() -> String {
    "README.txt".to_string()
}

/// File names inside a job directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_tree_file")]
    pub tree_file: String,

    #[serde(default = "default_exclusions_file")]
    pub exclusions_file: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            tree_file: default_tree_file(),
            exclusions_file: default_exclusions_file(),
        }
    }
}

fn default_tree_file() -> String {
    "tree.dat".to_string()
}

fn default_exclusions_file() -> String {
    "exclusions.txt".to_string()
}

/// Copy program invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyConfig {
    #[serde(default = "default_copy_program")]
    pub program: String,

    #[serde(default = "default_copy_args")]
    pub args: Vec<String>,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            program: default_copy_program(),
            args: default_copy_args(),
        }
    }
}

fn default_copy_program() -> String {
    "rsync".to_string()
}

fn default_copy_args() -> Vec<String> {
    vec!["-vrlptgoD".to_string(), "--safe-links".to_string()]
}

/// Terminal chooser appearance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Force ASCII icons even on a Unicode terminal
    #[serde(default)]
    pub ascii: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub job: JobConfig,

    #[serde(default)]
    pub copy: CopyConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        loader::load_with_warnings(path)
    }

    /// Resolve the effective configuration for a run
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        loader::resolve(explicit)
    }

    /// Apply environment variable overrides (TREEPICK_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self, |key| std::env::var(key).ok())
    }
}
