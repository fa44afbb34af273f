//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::types::Config;

/// Configuration file could not be used
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// A key the configuration does not know, reported but not fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Last segment of the dotted key path
    pub key: String,
    pub file: PathBuf,
    /// Line that defines the key, when it can be located
    pub line: Option<usize>,
    /// Closest known key within two edits
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}: ", self.file.display())?,
            None => write!(f, "{}: ", self.file.display())?,
        }
        write!(f, "unknown key '{}'", self.key)?;
        match &self.suggestion {
            Some(suggestion) => write!(f, ", did you mean '{suggestion}'?"),
            None => Ok(()),
        }
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .iter()
        .map(|dotted| {
            let key = dotted.rsplit('.').next().unwrap_or(dotted);
            ConfigWarning {
                key: key.to_string(),
                file: path.to_path_buf(),
                line: key_line(&content, dotted),
                suggestion: suggest_key(key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Resolve the configuration for a run
///
/// An explicitly named file must load. Otherwise the user config file is
/// used when present, falling back to defaults with a warning if it is
/// broken. Environment overrides apply last.
pub fn resolve(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match explicit {
        Some(path) => load_reporting(path)?,
        None => match user_config_path().filter(|path| path.exists()) {
            Some(path) => load_reporting(&path).unwrap_or_else(|error| {
                warn!("{error}; using default configuration");
                Config::default()
            }),
            None => Config::default(),
        },
    };

    Ok(with_env_overrides(config, |key| std::env::var(key).ok()))
}

fn load_reporting(path: &Path) -> Result<Config, ConfigError> {
    let (config, warnings) = load_with_warnings(path)?;
    for warning in &warnings {
        warn!("{warning}");
    }
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Apply environment variable overrides (TREEPICK_* prefix)
pub fn with_env_overrides<F>(mut config: Config, get_env: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // TREEPICK_COPY_PROGRAM
    if let Some(program) = get_env("TREEPICK_COPY_PROGRAM").filter(|p| !p.trim().is_empty()) {
        config.copy.program = program.trim().to_string();
    }

    // TREEPICK_COPY_ARGS (whitespace-separated)
    if let Some(args) = get_env("TREEPICK_COPY_ARGS") {
        config.copy.args = args.split_whitespace().map(str::to_string).collect();
    }

    // TREEPICK_ASCII
    if let Some(val) = get_env("TREEPICK_ASCII") {
        config.ui.ascii = val.to_lowercase() != "false" && val != "0";
    }

    config
}

/// `<config dir>/treepick/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("treepick").join("config.toml"))
}

/// 1-based line defining the dotted key `path`
///
/// A key is matched only inside its own table, so `[ui] program = ..` is
/// not mistaken for `[copy] program`. Unknown tables are found by header.
fn key_line(content: &str, path: &str) -> Option<usize> {
    let (table, key) = path.rsplit_once('.').unwrap_or(("", path));
    let mut current = "";

    for (number, line) in (1..).zip(content.lines()) {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = header.trim_matches(|c| c == '[' || c == ']').trim();
            if current == path {
                return Some(number);
            }
            continue;
        }
        let Some((name, _)) = line.split_once('=') else {
            continue;
        };
        if current == table && name.trim().trim_matches('"') == key {
            return Some(number);
        }
    }
    None
}

/// Every key the configuration accepts, tables included
const KNOWN_KEYS: &[&str] = &[
    "output",
    "manifest_name",
    "summary_name",
    "job",
    "tree_file",
    "exclusions_file",
    "copy",
    "program",
    "args",
    "ui",
    "ascii",
];

fn suggest_key(unknown: &str) -> Option<String> {
    KNOWN_KEYS
        .iter()
        .map(|known| (edit_distance(unknown, known), *known))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known.to_string())
}

/// Levenshtein distance over characters
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
        }
    }
    row[b.len()]
}
