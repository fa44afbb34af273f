//! Tree persistence
//!
//! - `codec` - Line-oriented JSON tree file format
//! - `job` - Locked job directory holding the tree file

mod codec;
mod job;

pub use codec::{decode, encode, load_tree, save_tree, CorruptDataError, FIELDS};
pub use job::{JobError, JobRepository};
