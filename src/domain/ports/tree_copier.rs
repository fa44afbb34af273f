//! Tree Copier Port
//!
//! Abstracts the external synchronization tool that copies the included
//! part of the source directory to the destination.

use std::path::{Path, PathBuf};

/// Error while copying the selected tree
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// The copy program could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The copy program ran but reported failure
    #[error("copy failed: '{program}' exited with {}", describe_code(.code))]
    Failed { program: String, code: Option<i32> },

    /// The destination directory could not be prepared
    #[error("cannot prepare destination {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("return code {code}"),
        None => "no return code (terminated by signal)".to_string(),
    }
}

/// Copies `source` into `destination`, skipping every path listed in the
/// exclusion file.
pub trait TreeCopier {
    /// Name of the copy method (for logging)
    fn name(&self) -> &str;

    fn copy(&self, source: &Path, destination: &Path, exclusions: &Path) -> Result<(), CopyError>;
}
