//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `scan` - Filesystem walk that builds the tree
//! - `persistence/` - Tree file codec and job directory repository
//! - `sync/` - Copy program adapters (rsync)

pub mod persistence;
pub mod scan;
pub mod sync;

// Re-export for convenience
pub use persistence::{CorruptDataError, JobError, JobRepository};
pub use scan::{ScanError, ScanStats, Scanner};
pub use sync::RsyncCopier;
