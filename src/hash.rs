//! Hash function abstraction for the tree.
//!
//! Leaves and internal nodes are both 32-byte digests. Keccak-256 is the
//! default since it is what OpenZeppelin's `MerkleProof` verifies on-chain;
//! SHA256 and BLAKE3 are available for off-chain commitments.

use alloy_primitives::{keccak256, B256};
use sha2::{Digest, Sha256};

/// Trait for hash functions used in the tree.
///
/// Only [`Hasher::hash_raw`] has to be provided. The leaf and pair rules are
/// fixed:
/// - leaf: `hash(hash(encoded_record))`
/// - pair: `hash(min(a, b) || max(a, b))`, comparing digests as big-endian
///   integers
///
/// # Thread Safety
///
/// This trait is always `Send + Sync` so that hashers can be used safely in
/// parallel contexts (e.g. level hashing via the `"parallel"` feature with rayon).
/// Custom hasher implementations must be thread-safe.
pub trait Hasher: Clone + Default + Send + Sync {
    /// Raw hash of arbitrary input
    fn hash_raw(&self, input: &[u8]) -> B256;

    /// Double hash of an encoded record.
    ///
    /// The second round keeps a 64-byte internal node preimage from ever being
    /// accepted as a leaf.
    fn hash_leaf(&self, encoded: &[u8]) -> B256 {
        let inner = self.hash_raw(encoded);
        self.hash_raw(inner.as_slice())
    }

    /// Commutative parent hash of two nodes.
    fn hash_pair(&self, a: &B256, b: &B256) -> B256 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let mut input = [0u8; 64];
        input[..32].copy_from_slice(lo.as_slice());
        input[32..].copy_from_slice(hi.as_slice());

        self.hash_raw(&input)
    }
}

/// Keccak-256 hasher, compatible with Solidity `keccak256` and OpenZeppelin
/// `MerkleProof.verify`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256Hasher;

impl Hasher for Keccak256Hasher {
    fn hash_raw(&self, input: &[u8]) -> B256 {
        keccak256(input)
    }
}

/// SHA256-based hasher.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash_raw(&self, input: &[u8]) -> B256 {
        B256::from_slice(&Sha256::digest(input))
    }
}

/// BLAKE3-based hasher.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn hash_raw(&self, input: &[u8]) -> B256 {
        B256::from_slice(blake3::hash(input).as_bytes())
    }
}
