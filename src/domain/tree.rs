//! Selectable directory tree
//!
//! An arena of [`Node`]s addressed by [`NodeId`]. Each node carries a
//! [`FilterState`], its raw `size` and the `filtered_size` counted under the
//! current filter. Parents own their children through the arena; the
//! `parent` link is a plain lookup index.
//!
//! # Filter invariant
//!
//! For every directory with children:
//!
//! - `IncludeAll` iff every child is `IncludeAll`
//! - `ExcludeAll` iff every child is `ExcludeAll`
//! - `Partial` otherwise
//!
//! and `filtered_size` is `size`, `0`, or the sum of the children's
//! `filtered_size` respectively. [`DirTree::include_all`] and
//! [`DirTree::exclude_all`] keep this true after every call by forcing the
//! target's subtree and re-deriving only the ancestor chain.


use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::domain::ports::{FilterObserver, SubscriptionId};
use crate::domain::value_objects::FilterState;

/// Index of a node inside its [`DirTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena (the root is always 0)
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A file or directory in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    /// On-disk bytes when the name is not valid UTF-8; `name` is then a
    /// lossy rendering for display
    raw_name: Option<Vec<u8>>,
    is_directory: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    size: u64,
    filter: FilterState,
    filtered_size: u64,
    notes: Option<String>,
}

impl Node {
    fn new(name: String, is_directory: bool, parent: Option<NodeId>, size: u64) -> Self {
        Self {
            name,
            raw_name: None,
            is_directory,
            parent,
            children: Vec::new(),
            size,
            filter: FilterState::IncludeAll,
            filtered_size: size,
            notes: None,
        }
    }

    /// An included, unattached node named as the filesystem reports it
    pub(crate) fn scanned(name: OsString, is_directory: bool, size: u64) -> Self {
        let (name, raw_name) = match name.into_string() {
            Ok(name) => (name, None),
            Err(raw) => (raw.to_string_lossy().into_owned(), raw_bytes(raw)),
        };
        Self {
            raw_name,
            ..Self::new(name, is_directory, None, size)
        }
    }

    /// Rebuild a node from persisted values, trusting them as stored
    pub(crate) fn restored(
        name: Vec<u8>,
        is_directory: bool,
        size: u64,
        filter: FilterState,
        filtered_size: u64,
        notes: Option<String>,
    ) -> Self {
        let (name, raw_name) = match String::from_utf8(name) {
            Ok(name) => (name, None),
            Err(e) => {
                let lossy = String::from_utf8_lossy(e.as_bytes()).into_owned();
                (lossy, Some(e.into_bytes()))
            }
        };
        Self {
            name,
            raw_name,
            is_directory,
            parent: None,
            children: Vec::new(),
            size,
            filter,
            filtered_size,
            notes: normalize_notes(notes),
        }
    }

    /// Local path segment (no trailing separator)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name exactly as it is on disk
    pub fn name_bytes(&self) -> &[u8] {
        self.raw_name.as_deref().unwrap_or(self.name.as_bytes())
    }

    /// True when `name()` is only a display form of a non-UTF-8 name
    pub fn has_lossy_name(&self) -> bool {
        self.raw_name.is_some()
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn filtered_size(&self) -> u64 {
        self.filtered_size
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn has_notes(&self) -> bool {
        self.notes.is_some()
    }
}

/// The first node found to break the filter invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterViolation {
    #[error("{path}: filter is {found} but its children imply {expected}")]
    State {
        node: NodeId,
        path: PathBuf,
        expected: FilterState,
        found: FilterState,
    },

    #[error("{path}: filtered size is {found} but should be {expected}")]
    FilteredSize {
        node: NodeId,
        path: PathBuf,
        expected: u64,
        found: u64,
    },

    #[error("{path}: children's filtered sizes overflow a byte count")]
    SizeOverflow { node: NodeId, path: PathBuf },
}

/// Selectable directory tree
pub struct DirTree {
    nodes: Vec<Node>,
    observers: Vec<(SubscriptionId, Box<dyn FilterObserver>)>,
    next_subscription: u64,
}

impl std::fmt::Debug for DirTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirTree")
            .field("nodes", &self.nodes)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl DirTree {
    /// Create a tree whose root is an empty directory
    ///
    /// Trailing `/` separators are dropped from the name, except for `/` itself.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self::from_root(Node::new(trim_separators(root_name.into()), true, None, 0))
    }

    pub(crate) fn from_root(mut root: Node) -> Self {
        root.parent = None;
        root.children.clear();
        Self {
            nodes: vec![root],
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Add an empty directory under `parent`
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a file.
    pub fn add_directory(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.add_node(parent, trim_separators(name.into()), true, 0)
    }

    /// Add a file of `size` bytes under `parent`
    ///
    /// Every ancestor's `size` grows by `size`, and their filter states and
    /// filtered sizes are re-derived so the invariant holds even when nodes
    /// are added after exclusions. Each call costs the total width of the
    /// ancestor chain; bulk builders should use the scanner instead.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a file.
    pub fn add_file(&mut self, parent: NodeId, name: impl Into<String>, size: u64) -> NodeId {
        self.add_node(parent, name.into(), false, size)
    }

    fn add_node(&mut self, parent: NodeId, name: String, is_directory: bool, size: u64) -> NodeId {
        assert!(
            self.nodes[parent.0].is_directory,
            "cannot add '{name}' under file '{}'",
            self.nodes[parent.0].name
        );

        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new(name, is_directory, Some(parent), size));
        self.nodes[parent.0].children.push(id);

        let mut current = Some(parent);
        while let Some(ancestor) = current {
            let node = &mut self.nodes[ancestor.0];
            node.size = node.size.saturating_add(size);
            self.rederive(ancestor);
            current = self.nodes[ancestor.0].parent;
        }

        id
    }

    /// Attach a restored node as the last child of `parent` without
    /// touching any other node
    pub(crate) fn attach(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Set the size of a fully included directory once its children are in
    pub(crate) fn set_included_size(&mut self, id: NodeId, size: u64) {
        let node = &mut self.nodes[id.0];
        debug_assert_eq!(node.filter, FilterState::IncludeAll);
        node.size = size;
        node.filtered_size = size;
    }

    /// Order `id`'s children by descending size; ties keep insertion order
    pub(crate) fn sort_children_by_size(&mut self, id: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        children.sort_by(|a, b| self.nodes[b.0].size.cmp(&self.nodes[a.0].size));
        self.nodes[id.0].children = children;
    }

    /// Re-sort every child list alphabetically, ignoring case
    pub fn sort_by_name(&mut self) {
        for index in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[index].children);
            children.sort_by_cached_key(|child| self.nodes[child.0].name.to_lowercase());
            self.nodes[index].children = children;
        }
    }

    // ------------------------------------------------------------------
    // Filter propagation
    // ------------------------------------------------------------------

    /// Exclude `id` and its whole subtree, then re-derive its ancestors
    pub fn exclude_all(&mut self, id: NodeId) {
        self.set_filter(id, FilterState::ExcludeAll);
    }

    /// Include `id` and its whole subtree, then re-derive its ancestors
    pub fn include_all(&mut self, id: NodeId) {
        self.set_filter(id, FilterState::IncludeAll);
    }

    /// Include an excluded node; exclude anything else
    pub fn toggle(&mut self, id: NodeId) {
        if self.nodes[id.0].filter.is_excluded() {
            self.include_all(id);
        } else {
            self.exclude_all(id);
        }
    }

    fn set_filter(&mut self, id: NodeId, state: FilterState) {
        let mut changed = Vec::new();

        // Subtree, target included. With a whole-subtree state each node's
        // filtered size depends only on itself, so visiting order is free.
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self.nodes[current.0];
            let before = (node.filter, node.filtered_size);
            node.filter = state;
            node.filtered_size = match state {
                FilterState::ExcludeAll => 0,
                _ => node.size,
            };
            if before != (node.filter, node.filtered_size) {
                changed.push(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }

        let mut current = self.nodes[id.0].parent;
        while let Some(ancestor) = current {
            if self.rederive(ancestor) {
                changed.push(ancestor);
            }
            current = self.nodes[ancestor.0].parent;
        }

        self.notify(&changed);
    }

    /// Re-derive a node's state from its immediate children and recompute
    /// its filtered size. Returns true if anything changed.
    fn rederive(&mut self, id: NodeId) -> bool {
        let node = &self.nodes[id.0];
        let before = (node.filter, node.filtered_size);
        let state = FilterState::derive(node.children.iter().map(|c| self.nodes[c.0].filter))
            .unwrap_or(node.filter);
        let filtered_size = self
            .expected_filtered_size(id, state)
            .unwrap_or(u64::MAX);

        let node = &mut self.nodes[id.0];
        node.filter = state;
        node.filtered_size = filtered_size;
        before != (state, filtered_size)
    }

    /// `None` when the children's filtered sizes do not fit in a `u64`
    fn expected_filtered_size(&self, id: NodeId, state: FilterState) -> Option<u64> {
        let node = &self.nodes[id.0];
        match state {
            FilterState::IncludeAll => Some(node.size),
            FilterState::ExcludeAll => Some(0),
            FilterState::Partial => node
                .children
                .iter()
                .try_fold(0u64, |sum, c| sum.checked_add(self.nodes[c.0].filtered_size)),
        }
    }

    fn notify(&mut self, changed: &[NodeId]) {
        if self.observers.is_empty() {
            return;
        }
        let nodes = &self.nodes;
        for &id in changed {
            for (_, observer) in self.observers.iter_mut() {
                observer.on_filter_changed(id, &nodes[id.0]);
            }
        }
    }

    /// Register a listener for filter changes
    pub fn subscribe(&mut self, observer: impl FilterObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != subscription);
        self.observers.len() != before
    }

    /// Check the filter invariant over the whole tree
    ///
    /// Loaded trees trust their stored states; this reports the first node
    /// (in pre-order) whose stored values disagree with its children.
    pub fn verify_filters(&self) -> Result<(), FilterViolation> {
        for id in self.preorder() {
            let node = &self.nodes[id.0];
            if let Some(expected) =
                FilterState::derive(node.children.iter().map(|c| self.nodes[c.0].filter))
            {
                if expected != node.filter {
                    return Err(FilterViolation::State {
                        node: id,
                        path: self.path(id),
                        expected,
                        found: node.filter,
                    });
                }
            }

            let Some(expected) = self.expected_filtered_size(id, node.filter) else {
                return Err(FilterViolation::SizeOverflow {
                    node: id,
                    path: self.path(id),
                });
            };
            if expected != node.filtered_size {
                return Err(FilterViolation::FilteredSize {
                    node: id,
                    path: self.path(id),
                    expected,
                    found: node.filtered_size,
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    /// Set or clear a node's notes; blank text clears them
    pub fn set_notes(&mut self, id: NodeId, notes: Option<String>) {
        self.nodes[id.0].notes = normalize_notes(notes);
    }

    // ------------------------------------------------------------------
    // Paths and traversal
    // ------------------------------------------------------------------

    /// Full path: the root's name followed by every name down to `id`
    pub fn path(&self, id: NodeId) -> PathBuf {
        let mut path = PathBuf::from(&self.nodes[0].name);
        path.push(self.relative_path(id));
        path
    }

    /// Path below the root; empty for the root itself
    pub fn relative_path(&self, id: NodeId) -> PathBuf {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .take_while(|ancestor| ancestor.0 != 0)
            .map(|ancestor| self.nodes[ancestor.0].name.as_str())
            .collect();
        names.reverse();
        names.iter().collect()
    }

    /// Name with a trailing `/` for directories
    pub fn display_name(&self, id: NodeId) -> String {
        let node = &self.nodes[id.0];
        if node.is_directory && !node.name.ends_with('/') {
            format!("{}/", node.name)
        } else {
            node.name.clone()
        }
    }

    /// `id` itself, then its parent, up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Pre-order walk of the whole tree
    pub fn preorder(&self) -> Preorder<'_> {
        self.preorder_from(self.root())
    }

    /// Pre-order walk of the subtree rooted at `id`
    pub fn preorder_from(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![id],
        }
    }

    /// Look up a node by its path below the root
    pub fn find(&self, relative: impl AsRef<Path>) -> Option<NodeId> {
        let mut current = self.root();
        for component in relative.as_ref().components() {
            match component {
                Component::CurDir => continue,
                Component::Normal(name) => {
                    let name = name.to_str()?;
                    current = *self.nodes[current.0]
                        .children
                        .iter()
                        .find(|child| self.nodes[child.0].name == name)?;
                }
                _ => return None,
            }
        }
        Some(current)
    }
}

impl std::ops::Index<NodeId> for DirTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.node(id)
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a> {
    tree: &'a DirTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.nodes[current.0].parent;
        Some(current)
    }
}

/// Depth-first, node-before-children iterator
pub struct Preorder<'a> {
    tree: &'a DirTree,
    stack: Vec<NodeId>,
}

impl Preorder<'_> {
    /// Do not descend into the children of the node returned last
    ///
    /// Must be called right after `next()` returned that node.
    pub fn skip_children(&mut self, id: NodeId) {
        let count = self.tree.nodes[id.0].children.len();
        let keep = self.stack.len().saturating_sub(count);
        self.stack.truncate(keep);
    }
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[current.0].children.iter().rev().copied());
        Some(current)
    }
}

/// Drop trailing `/` separators unless nothing else is left
pub(crate) fn trim_separators(name: String) -> String {
    let trimmed = name.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.len() == name.len() {
        name
    } else {
        trimmed.to_string()
    }
}

#[cfg(unix)]
fn raw_bytes(name: OsString) -> Option<Vec<u8>> {
    use std::os::unix::ffi::OsStringExt;
    Some(name.into_vec())
}

#[cfg(not(unix))]
fn raw_bytes(_name: OsString) -> Option<Vec<u8>> {
    None
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
