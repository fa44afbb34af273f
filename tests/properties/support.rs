//! Tree and operation generators shared by the property suites.

use proptest::prelude::*;

use treepick::{DirTree, NodeId};

/// One node to add: a seed choosing its parent among the directories
/// created so far, whether it is a directory, and its size if a file.
pub type NodeSpec = (usize, bool, u64);

/// One filter operation: a seed choosing the node, and the kind
pub type OpSpec = (usize, Op);

#[derive(Debug, Clone, Copy)]
pub enum Op {
    Include,
    Exclude,
    Toggle,
}

pub fn node_specs() -> impl Strategy<Value = Vec<NodeSpec>> {
    proptest::collection::vec((any::<usize>(), any::<bool>(), 0u64..10_000), 0..40)
}

pub fn op_specs() -> impl Strategy<Value = Vec<OpSpec>> {
    let op = prop_oneof![Just(Op::Include), Just(Op::Exclude), Just(Op::Toggle)];
    proptest::collection::vec((any::<usize>(), op), 0..20)
}

pub fn build_tree(specs: &[NodeSpec]) -> DirTree {
    let mut tree = DirTree::new("root");
    let mut directories = vec![tree.root()];
    for (i, &(seed, is_directory, size)) in specs.iter().enumerate() {
        let parent = directories[seed % directories.len()];
        let name = format!("n{i}");
        if is_directory {
            directories.push(tree.add_directory(parent, name));
        } else {
            tree.add_file(parent, name, size);
        }
    }
    tree
}

pub fn pick(tree: &DirTree, seed: usize) -> NodeId {
    let ids: Vec<NodeId> = tree.preorder().collect();
    ids[seed % ids.len()]
}

pub fn apply(tree: &mut DirTree, (seed, op): OpSpec) {
    let id = pick(tree, seed);
    match op {
        Op::Include => tree.include_all(id),
        Op::Exclude => tree.exclude_all(id),
        Op::Toggle => tree.toggle(id),
    }
}
