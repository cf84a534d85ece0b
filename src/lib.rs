//! # Standard Merkle Tree
//!
//! Merkle commitments over lists of typed records (e.g. address whitelists)
//! with succinct membership proofs that a contract holding only the root can
//! check.
//!
//! Key features:
//!
//! - **Typed leaves**: records are tuples of static Solidity types, ABI-encoded
//!   and double-hashed: `leaf = H(H(abi.encode(record)))`
//! - **Sorted pairs**: parents are `H(min(a, b) || max(a, b))`, so proofs carry
//!   no left/right bits
//! - **Canonical shape**: leaves are sorted by hash and laid out as a complete
//!   binary tree in a flat array; odd leaf counts never duplicate a leaf
//! - **Portable documents**: trees dump to and load from the JSON format used
//!   by OpenZeppelin's `StandardMerkleTree`
//!
//! ## Example
//!
//! ```
//! use standard_merkle_tree::{address, LeafEncoding, LeafValue, StandardMerkleTree};
//!
//! let values = vec![
//!     vec![LeafValue::from(address!("344ef496b004663a04d70B427a78E33cC3E9f619"))],
//!     vec![LeafValue::from(address!("952687863142ce6f9cFE7D264C5AF405642F6AA8"))],
//!     vec![LeafValue::from(address!("42188104f27FeaAB648388227ae3C5C7cB16Ca6e"))],
//! ];
//! let tree = StandardMerkleTree::of(values.clone(), LeafEncoding::address()).unwrap();
//!
//! let proof = tree.proof_by_value(&values[1]).unwrap();
//! assert!(tree.verify(&values[1], &proof));
//!
//! let reloaded = StandardMerkleTree::load(&tree.dump()).unwrap();
//! assert_eq!(reloaded.root(), tree.root());
//! ```
//!
//! ## Hash Function
//!
//! Keccak-256 by default, which is what OpenZeppelin `MerkleProof` verifies
//! on-chain. SHA256 and BLAKE3 are available through the [`Hasher`] trait.

mod document;
mod encoding;
mod error;
mod hash;
pub mod node;
mod proof;
mod tree;

pub use document::{DocumentEntry, MerkleTreeDocument, ProofBundle, RecordProof, STANDARD_FORMAT};
pub use encoding::{AbiType, LeafEncoding, LeafValue, Record, WORD_LEN};
pub use error::{MerkleError, Result};
pub use hash::{Blake3Hasher, Hasher, Keccak256Hasher, Sha256Hasher};
pub use node::Node;
pub use proof::{verify, MultiProof, Proof};
pub use tree::{Entry, StandardMerkleTree, TreeOptions};

/// Re-export alloy primitives for convenience
pub use alloy_primitives::{address, Address, Bytes, B256, I256, U256};
