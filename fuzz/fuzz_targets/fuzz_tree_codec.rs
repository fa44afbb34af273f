#![no_main]

use libfuzzer_sys::fuzz_target;
use treepick::application::export::{write_exclusions, write_manifest};

fuzz_target!(|data: &[u8]| {
    // Decoding must fail cleanly, and anything that decodes must re-encode
    let Ok(mut tree) = treepick::decode(data) else {
        return;
    };
    let mut out = Vec::new();
    treepick::encode(&tree, &mut out).unwrap();
    let again = treepick::decode(out.as_slice()).unwrap();
    assert_eq!(again.node_count(), tree.node_count());

    // Stored sizes are untrusted: checking and editing must not panic
    let _ = tree.verify_filters();
    write_exclusions(&tree, std::io::sink()).unwrap();
    write_manifest(&tree, std::io::sink()).unwrap();

    let last = tree.preorder().last().unwrap();
    tree.toggle(last);
    tree.toggle(tree.root());
});
