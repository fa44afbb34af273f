//! Tree Selector Port
//!
//! The interactive step in which the user includes and excludes subtrees
//! and edits notes before the copy.

use crate::domain::tree::DirTree;

/// How an interactive selection session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The user is done; continue with the current filter states
    Confirmed,
    /// The user abandoned the run
    Aborted,
}

/// Lets a user mutate the tree's filter states and notes
pub trait TreeSelector {
    fn select(&mut self, tree: &mut DirTree) -> std::io::Result<SelectionOutcome>;
}
