//! Filter Observer Port
//!
//! Lets a presentation layer resynchronize its view incrementally when the
//! filter propagation engine changes node states.

use crate::domain::tree::{Node, NodeId};

/// Listener notified once per node whose filter state or filtered size
/// changed during an `include_all` / `exclude_all` call.
///
/// Invoked synchronously on the mutating thread, after the node's new
/// values are final.
pub trait FilterObserver {
    fn on_filter_changed(&mut self, id: NodeId, node: &Node);
}

impl<F> FilterObserver for F
where
    F: FnMut(NodeId, &Node),
{
    fn on_filter_changed(&mut self, id: NodeId, node: &Node) {
        self(id, node)
    }
}

/// Handle returned by `DirTree::subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
