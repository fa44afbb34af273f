//! Job directory repository
//!
//! A job directory lets repeated runs over the same source skip the scan:
//!
//! ```text
//! <job>/
//!   tree.dat          persisted tree
//!   exclusions.txt    last exclusion list handed to the copy program
//!   .treepick.lock    held exclusively while a run is active
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use super::codec::{self, CorruptDataError};
use crate::config::JobConfig;
use crate::domain::tree::DirTree;

const LOCK_FILE: &str = ".treepick.lock";

/// Job directory failure; all variants are fatal
#[derive(Error, Debug)]
pub enum JobError {
    #[error("cannot create job directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("job directory {path} is in use by another run")]
    Locked { path: PathBuf },

    #[error("cannot lock job directory {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot save tree to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An open, locked job directory
///
/// The lock is released when the repository is dropped.
#[derive(Debug)]
pub struct JobRepository {
    dir: PathBuf,
    tree_path: PathBuf,
    exclusions_path: PathBuf,
    lock: fs::File,
}

impl JobRepository {
    /// Create `dir` if needed and take its lock without waiting
    pub fn open(dir: &Path, config: &JobConfig) -> Result<Self, JobError> {
        fs::create_dir_all(dir).map_err(|source| JobError::Create {
            path: dir.to_path_buf(),
            source,
        })?;

        let lock_path = dir.join(LOCK_FILE);
        let lock = fs::File::create(&lock_path).map_err(|source| JobError::Lock {
            path: lock_path.clone(),
            source,
        })?;
        lock.try_lock_exclusive().map_err(|source| {
            if source.kind() == fs2::lock_contended_error().kind() {
                JobError::Locked {
                    path: dir.to_path_buf(),
                }
            } else {
                JobError::Lock {
                    path: lock_path.clone(),
                    source,
                }
            }
        })?;
        debug!(dir = %dir.display(), "locked job directory");

        Ok(Self {
            dir: dir.to_path_buf(),
            tree_path: dir.join(&config.tree_file),
            exclusions_path: dir.join(&config.exclusions_file),
            lock,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tree_path(&self) -> &Path {
        &self.tree_path
    }

    pub fn exclusions_path(&self) -> &Path {
        &self.exclusions_path
    }

    /// The saved tree, or `None` if this job has not saved one yet
    pub fn load(&self) -> Result<Option<DirTree>, CorruptDataError> {
        if !self.tree_path.exists() {
            return Ok(None);
        }
        codec::load_tree(&self.tree_path).map(Some)
    }

    pub fn save(&self, tree: &DirTree) -> Result<(), JobError> {
        codec::save_tree(tree, &self.tree_path).map_err(|source| JobError::Save {
            path: self.tree_path.clone(),
            source,
        })
    }
}

impl Drop for JobRepository {
    fn drop(&mut self) {
        let _ = self.lock.unlock();
    }
}
