#![no_main]

use libfuzzer_sys::fuzz_target;
use standard_merkle_tree::{MerkleTreeDocument, StandardMerkleTree};

/// Fuzz document loading with arbitrary JSON
/// Malformed or inconsistent documents must be rejected without panicking,
/// and anything that loads must prove every one of its entries.
fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(document) = MerkleTreeDocument::from_json(raw) else {
        return;
    };
    let Ok(tree) = StandardMerkleTree::load(&document) else {
        return;
    };

    for (i, record) in tree.entries() {
        let proof = tree.proof(i).expect("loaded entry has a proof");
        assert!(tree.verify(record, &proof));
    }
    let _ = tree.render();
});
