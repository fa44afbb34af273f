//! Backup Result

use std::path::PathBuf;

/// Where the tree of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOrigin {
    /// Fresh filesystem scan
    Scanned,
    /// Job directory tree file
    Loaded,
}

/// Result of a backup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub origin: TreeOrigin,
    /// Size of the whole source tree
    pub total_size: u64,
    /// Size of the included part
    pub included_size: u64,
    /// Whether the tree was written to the job directory
    pub saved: bool,
    /// Whether the copy program ran and succeeded
    pub copied: bool,
    /// Number of exclusion patterns handed to the copy program
    pub exclusions: usize,
    /// Summary and manifest files written next to the copy
    pub reports: Vec<PathBuf>,
}

impl BackupReport {
    pub fn new(origin: TreeOrigin, total_size: u64, included_size: u64) -> Self {
        Self {
            origin,
            total_size,
            included_size,
            saved: false,
            copied: false,
            exclusions: 0,
            reports: Vec::new(),
        }
    }
}
