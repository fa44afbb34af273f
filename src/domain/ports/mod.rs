//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure and UI layers provide concrete implementations.

pub mod filter_observer;
pub mod tree_copier;
pub mod tree_selector;

pub use filter_observer::{FilterObserver, SubscriptionId};
pub use tree_copier::{CopyError, TreeCopier};
pub use tree_selector::{SelectionOutcome, TreeSelector};
