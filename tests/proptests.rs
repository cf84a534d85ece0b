//! Property-based tests using proptest.
//!
//! Each property builds trees from random record sets and checks a
//! commitment or proof guarantee against them.

use proptest::prelude::*;
use standard_merkle_tree::{
    verify, Address, Hasher, Keccak256Hasher, LeafEncoding, LeafValue, MerkleTreeDocument, Proof,
    Record, StandardMerkleTree, B256, I256, U256,
};

// ============================================================================
// Strategies for generating random test data
// ============================================================================

fn arb_address() -> impl Strategy<Value = Address> {
    prop::array::uniform20(any::<u8>()).prop_map(Address::from)
}

fn arb_node() -> impl Strategy<Value = B256> {
    prop::array::uniform32(any::<u8>()).prop_map(B256::from)
}

fn arb_address_records(max_len: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_address().prop_map(|a| vec![LeafValue::from(a)]), 1..max_len)
}

/// Records of `(address, uint{bits}, int64, bool)` with values that fit.
fn arb_mixed_records(max_len: usize) -> impl Strategy<Value = (LeafEncoding, Vec<Record>)> {
    (prop::sample::select(vec![8u16, 32, 128, 256]), 1..max_len).prop_flat_map(|(bits, len)| {
        let uint = any::<u128>().prop_map(move |v| {
            let v = U256::from(v);
            if bits < 256 {
                v & ((U256::from(1u8) << bits as usize) - U256::from(1u8))
            } else {
                v
            }
        });
        let record = (arb_address(), uint, any::<i64>(), any::<bool>()).prop_map(|(a, u, i, b)| {
            vec![
                LeafValue::from(a),
                LeafValue::from(u),
                LeafValue::from(I256::try_from(i).unwrap()),
                LeafValue::from(b),
            ]
        });
        let encoding = LeafEncoding::parse(&[
            "address".to_string(),
            format!("uint{bits}"),
            "int64".to_string(),
            "bool".to_string(),
        ])
        .unwrap();
        prop::collection::vec(record, len..=len).prop_map(move |records| (encoding.clone(), records))
    })
}

fn build(records: Vec<Record>) -> StandardMerkleTree {
    StandardMerkleTree::of(records, LeafEncoding::address()).unwrap()
}

// ============================================================================
// Commitment properties
// ============================================================================

proptest! {
    /// The root does not depend on input order
    #[test]
    fn prop_root_order_independent(
        records in arb_address_records(40),
        seed in any::<u64>()
    ) {
        let mut shuffled = records.clone();
        // Deterministic rotation + reversal driven by the seed
        let k = (seed as usize) % shuffled.len();
        shuffled.rotate_left(k);
        if seed % 2 == 0 {
            shuffled.reverse();
        }

        prop_assert_eq!(build(records).root(), build(shuffled).root());
    }

    /// The pair hash is commutative
    #[test]
    fn prop_pair_hash_commutative(a in arb_node(), b in arb_node()) {
        prop_assert_eq!(Keccak256Hasher.hash_pair(&a, &b), Keccak256Hasher.hash_pair(&b, &a));
    }

    /// Every entry leaf sits at a distinct leaf position holding its hash
    #[test]
    fn prop_leaf_positions(records in arb_address_records(40)) {
        let tree = build(records);
        let n = tree.len();
        let mut seen = vec![false; 2 * n - 1];

        for (i, record) in tree.entries() {
            let index = tree.tree_index(i).unwrap();
            prop_assert!(index >= n - 1 && index < 2 * n - 1);
            prop_assert!(!seen[index]);
            seen[index] = true;
            prop_assert_eq!(tree.nodes()[index], tree.leaf_hash(record).unwrap());
        }
    }
}

// ============================================================================
// Proof properties
// ============================================================================

proptest! {
    /// Every present record proves against the root
    #[test]
    fn prop_present_records_verify(records in arb_address_records(40)) {
        let tree = build(records);
        for (i, record) in tree.entries() {
            let proof = tree.proof_by_value(record).unwrap();
            prop_assert!(verify(&Keccak256Hasher, tree.leaf_encoding(), record, &proof, &tree.root()));
            prop_assert!(tree.verify(record, &tree.proof(i).unwrap()));
        }
    }

    /// An absent record fails with any of the tree's proofs
    #[test]
    fn prop_absent_record_fails(
        records in arb_address_records(20),
        outsider in arb_address()
    ) {
        let outsider = vec![LeafValue::from(outsider)];
        prop_assume!(!records.contains(&outsider));
        let tree = build(records);

        for i in 0..tree.len() {
            prop_assert!(!tree.verify(&outsider, &tree.proof(i).unwrap()));
        }
        prop_assert!(!tree.verify(&outsider, &Proof::default()));
    }

    /// A proof only verifies the record it was generated for
    #[test]
    fn prop_proof_bound_to_record(records in arb_address_records(20)) {
        let tree = build(records);
        for i in 0..tree.len() {
            let proof = tree.proof(i).unwrap();
            for (j, other) in tree.entries() {
                if other != tree.value(i).unwrap() {
                    prop_assert!(!tree.verify(other, &proof), "entry {} with proof {}", j, i);
                }
            }
        }
    }

    /// Multi-proofs verify for any subset of entries
    #[test]
    fn prop_multi_proof_verifies(
        records in arb_address_records(30),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10)
    ) {
        let tree = build(records);
        let mut indices: Vec<usize> = picks.iter().map(|p| p.index(tree.len())).collect();
        indices.sort_unstable();
        indices.dedup();

        let multi = tree.multi_proof(&indices).unwrap();
        prop_assert!(tree.verify_multi_proof(&multi));
    }
}

// ============================================================================
// Document round-trip properties
// ============================================================================

proptest! {
    /// load(dump(t)) keeps the root and every record -> index pair
    #[test]
    fn prop_dump_load_roundtrip((encoding, records) in arb_mixed_records(30)) {
        let tree = StandardMerkleTree::of(records, encoding).unwrap();
        let json = tree.dump().to_json_pretty().unwrap();
        let loaded = StandardMerkleTree::load(&MerkleTreeDocument::from_json(&json).unwrap()).unwrap();

        prop_assert_eq!(loaded.root(), tree.root());
        prop_assert_eq!(loaded.nodes(), tree.nodes());
        prop_assert_eq!(loaded.leaf_encoding(), tree.leaf_encoding());
        for (i, record) in tree.entries() {
            prop_assert_eq!(loaded.value(i).unwrap(), record);
            prop_assert_eq!(loaded.tree_index(i).unwrap(), tree.tree_index(i).unwrap());
        }
    }

    /// Flipping any node of a dumped tree makes it unloadable
    #[test]
    fn prop_tampered_document_rejected(
        records in arb_address_records(20),
        pick in any::<prop::sample::Index>(),
        junk in arb_node()
    ) {
        let tree = build(records);
        let mut document = tree.dump();
        let i = pick.index(document.tree.len());
        prop_assume!(document.tree[i] != junk);
        document.tree[i] = junk;

        prop_assert!(StandardMerkleTree::load(&document).is_err());
    }
}
