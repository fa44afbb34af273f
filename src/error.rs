//! Error types for treepick
//!
//! Each layer owns a `thiserror` enum; `TreepickError` gathers them so the
//! use case and the binary can propagate with `?`.

use thiserror::Error;

pub use crate::application::backup::BackupError;
pub use crate::config::ConfigError;
pub use crate::domain::ports::CopyError;
pub use crate::infrastructure::persistence::{CorruptDataError, JobError};
pub use crate::infrastructure::scan::ScanError;

/// Result type alias for treepick operations
pub type TreepickResult<T> = Result<T, TreepickError>;

/// Main error type for treepick operations
#[derive(Error, Debug)]
pub enum TreepickError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    CorruptData(#[from] CorruptDataError),

    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
