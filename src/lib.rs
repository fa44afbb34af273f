//! Treepick - interactive selective backup
//!
//! Treepick scans a source directory into a selectable tree, lets the user
//! include and exclude subtrees and annotate them, then copies the included
//! part with rsync and leaves a manifest and a summary next to the copy.
//! A job directory keeps the tree between runs.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;

// Re-exports for convenience
pub use application::{BackupOptions, BackupReport, BackupUseCase, TreeOrigin};
pub use config::Config;
pub use domain::tree::{DirTree, Node, NodeId};
pub use domain::value_objects::{ByteSize, FilterState};
pub use error::{TreepickError, TreepickResult};
pub use infrastructure::persistence::{decode, encode, load_tree, save_tree};
pub use infrastructure::{RsyncCopier, Scanner};
pub use ui::TreeChooser;
