//! Property tests for the tree file format.

use proptest::prelude::*;

use treepick::{decode, encode, DirTree, NodeId};

use crate::support::{apply, build_tree, node_specs, op_specs, pick};

fn encoded(tree: &DirTree) -> Vec<u8> {
    let mut out = Vec::new();
    encode(tree, &mut out).unwrap();
    out
}

fn note_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z ,\"\\\\\n\u{e9}\u{1F4F7}]{1,24}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: load(save(tree)) reproduces names, flags, sizes, filters, notes and topology.
    #[test]
    fn property_decode_reproduces_encoded_tree(
        specs in node_specs(),
        ops in op_specs(),
        notes in proptest::collection::vec((any::<usize>(), note_text()), 0..5),
    ) {
        let mut tree = build_tree(&specs);
        for op in ops {
            apply(&mut tree, op);
        }
        for (seed, text) in notes {
            let id = pick(&tree, seed);
            tree.set_notes(id, Some(text));
        }

        let loaded = decode(encoded(&tree).as_slice()).unwrap();

        prop_assert_eq!(loaded.node_count(), tree.node_count());
        let original: Vec<NodeId> = tree.preorder().collect();
        let restored: Vec<NodeId> = loaded.preorder().collect();
        for (&a, &b) in original.iter().zip(&restored) {
            let (x, y) = (&tree[a], &loaded[b]);
            prop_assert_eq!(x.name(), y.name());
            prop_assert_eq!(x.is_directory(), y.is_directory());
            prop_assert_eq!(x.size(), y.size());
            prop_assert_eq!(x.filter(), y.filter());
            prop_assert_eq!(x.filtered_size(), y.filtered_size());
            prop_assert_eq!(x.notes(), y.notes());
            prop_assert_eq!(x.children().len(), y.children().len());
            prop_assert_eq!(tree.relative_path(a), loaded.relative_path(b));
        }
        prop_assert_eq!(encoded(&loaded), encoded(&tree));
    }

    /// PROPERTY: decoding arbitrary text never panics.
    #[test]
    fn property_decode_never_panics(input in "(?s).{0,512}") {
        let _ = decode(input.as_bytes());
    }

    /// PROPERTY: decoding arbitrary record lines after a valid header never panics.
    #[test]
    fn property_decode_records_never_panics(
        records in proptest::collection::vec("\\[[0-9a-z\", \\[\\]]{0,40}\\]", 0..8),
    ) {
        let mut input = String::from(
            "[\"id\",\"name\",\"is_directory\",\"parent\",\"size\",\"filter\",\"filtered_size\",\"notes\"]\n",
        );
        for record in records {
            input.push_str(&record);
            input.push('\n');
        }
        let _ = decode(input.as_bytes());
    }
}
