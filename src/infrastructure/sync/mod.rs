//! Copy Implementations
//!
//! Concrete implementations of the TreeCopier port:
//! - RsyncCopier: rsync with an exclusion file

mod rsync;

pub use rsync::RsyncCopier;
