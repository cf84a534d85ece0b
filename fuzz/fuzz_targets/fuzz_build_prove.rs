#![no_main]

use libfuzzer_sys::fuzz_target;
use standard_merkle_tree::{Address, LeafEncoding, LeafValue, StandardMerkleTree, U256};

/// Fuzz building trees from arbitrary `(address, uint256)` records
/// Every entry must prove, multi-prove, and survive a dump/load round trip.
fuzz_target!(|data: &[u8]| {
    // 20 bytes of address + 32 bytes of amount per record
    let records: Vec<_> = data
        .chunks_exact(52)
        .take(64)
        .map(|chunk| {
            vec![
                LeafValue::from(Address::from_slice(&chunk[..20])),
                LeafValue::from(U256::from_be_slice(&chunk[20..])),
            ]
        })
        .collect();
    if records.is_empty() {
        return;
    }

    let encoding = LeafEncoding::parse(&["address", "uint256"]).unwrap();
    let tree = StandardMerkleTree::of(records, encoding).unwrap();

    for (i, record) in tree.entries() {
        let proof = tree.proof_by_value(record).unwrap();
        assert!(tree.verify(record, &proof), "entry {i}");
    }

    let indices: Vec<usize> = (0..tree.len()).step_by(2).collect();
    let multi = tree.multi_proof(&indices).unwrap();
    assert!(tree.verify_multi_proof(&multi));

    let loaded = StandardMerkleTree::load(&tree.dump()).unwrap();
    assert_eq!(loaded.root(), tree.root());
});
