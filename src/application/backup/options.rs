//! Backup Options

use std::path::PathBuf;

/// Options for the backup use case
#[derive(Debug, Clone, Default)]
pub struct BackupOptions {
    /// Directory to back up
    pub source: PathBuf,
    /// Where the copy goes; required unless `dry_run`
    pub destination: Option<PathBuf>,
    /// Job directory for the persisted tree, exclusion list and lock
    pub job_dir: Option<PathBuf>,
    /// Skip the copy phase
    pub dry_run: bool,
    /// Skip the interactive chooser
    pub quiet: bool,
}

impl BackupOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_job_dir(mut self, job_dir: impl Into<PathBuf>) -> Self {
        self.job_dir = Some(job_dir.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}
