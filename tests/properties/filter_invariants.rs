//! Property tests for filter propagation.

use proptest::prelude::*;

use treepick::application::included_entries;
use treepick::{DirTree, FilterState, NodeId};

use crate::support::{apply, build_tree, node_specs, op_specs, pick};

/// Filter state and filtered size of every node, in pre-order
fn snapshot(tree: &DirTree) -> Vec<(FilterState, u64)> {
    tree.preorder()
        .map(|id| (tree[id].filter(), tree[id].filtered_size()))
        .collect()
}

fn included_ids(tree: &DirTree) -> Vec<NodeId> {
    included_entries(tree).into_iter().map(|entry| entry.id).collect()
}

fn check_node(tree: &DirTree, id: NodeId) -> Result<(), TestCaseError> {
    let node = &tree[id];
    if !node.is_directory() {
        let expected = if node.filter().is_included() { node.size() } else { 0 };
        prop_assert_eq!(node.filtered_size(), expected);
        prop_assert!(node.filter() != FilterState::Partial);
        return Ok(());
    }

    let children = node.children();
    let size: u64 = children.iter().map(|&c| tree[c].size()).sum();
    let filtered: u64 = children.iter().map(|&c| tree[c].filtered_size()).sum();
    prop_assert_eq!(node.size(), size);
    if !children.is_empty() {
        prop_assert_eq!(node.filtered_size(), filtered);
        let derived = FilterState::derive(children.iter().map(|&c| tree[c].filter()));
        prop_assert_eq!(Some(node.filter()), derived);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every node is consistent with its children after any sequence of operations.
    #[test]
    fn property_invariants_hold_after_every_operation(
        specs in node_specs(),
        ops in op_specs(),
    ) {
        let mut tree = build_tree(&specs);
        for op in ops {
            apply(&mut tree, op);
            for id in tree.preorder() {
                check_node(&tree, id)?;
            }
            prop_assert!(tree.verify_filters().is_ok());
        }
    }

    /// PROPERTY: the root's size is the sum of all file sizes and never changes.
    #[test]
    fn property_sizes_are_conserved(
        specs in node_specs(),
        ops in op_specs(),
    ) {
        let mut tree = build_tree(&specs);
        let total: u64 = specs.iter().filter(|s| !s.1).map(|s| s.2).sum();
        prop_assert_eq!(tree[tree.root()].size(), total);

        for op in ops {
            apply(&mut tree, op);
            prop_assert_eq!(tree[tree.root()].size(), total);

            let included: u64 = tree
                .preorder()
                .filter(|&id| !tree[id].is_directory() && tree[id].filter().is_included())
                .map(|id| tree[id].size())
                .sum();
            prop_assert_eq!(tree[tree.root()].filtered_size(), included);
        }
    }

    /// PROPERTY: repeating include_all / exclude_all changes nothing.
    #[test]
    fn property_include_and_exclude_are_idempotent(
        specs in node_specs(),
        ops in op_specs(),
        seed in any::<usize>(),
        exclude in any::<bool>(),
    ) {
        let mut tree = build_tree(&specs);
        for op in ops {
            apply(&mut tree, op);
        }
        let id = pick(&tree, seed);

        let run = |tree: &mut DirTree| if exclude { tree.exclude_all(id) } else { tree.include_all(id) };
        run(&mut tree);
        let once = snapshot(&tree);
        run(&mut tree);

        prop_assert_eq!(snapshot(&tree), once);
    }

    /// PROPERTY: excluding a node only ever removes entries from the included listing.
    #[test]
    fn property_exclusion_prunes_monotonically(
        specs in node_specs(),
        ops in op_specs(),
        seed in any::<usize>(),
    ) {
        let mut tree = build_tree(&specs);
        for op in ops {
            apply(&mut tree, op);
        }
        let before = included_ids(&tree);
        let id = pick(&tree, seed);

        tree.exclude_all(id);
        let after = included_ids(&tree);

        prop_assert!(after.iter().all(|id| before.contains(id)));
        prop_assert!(!after.contains(&id));
    }
}
