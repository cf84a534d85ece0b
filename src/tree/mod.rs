//! Main tree implementation.
//!
//! This module provides [`StandardMerkleTree`], an immutable commitment over
//! a list of typed records. It supports:
//!
//! - Construction from records with a declared [`LeafEncoding`]
//! - Canonical leaf ordering (leaves sorted by hash) so the root does not
//!   depend on input order
//! - Proofs by tree index, entry index or value (see [`crate::Proof`])
//! - Lossless dump/load through [`crate::MerkleTreeDocument`]
//! - Parallel leaf and level hashing via rayon (when `parallel` feature is enabled)
//!
//! # Performance Characteristics
//!
//! | Operation        | Cost         |
//! |------------------|--------------|
//! | Build            | O(n log n)   |
//! | Proof            | O(log n)     |
//! | Lookup by value  | O(1)         |
//! | Validate / load  | O(n)         |

mod build;
mod hash;
mod render;

use alloy_primitives::B256;
use std::collections::HashMap;

use crate::{
    error::Result, Hasher, Keccak256Hasher, LeafEncoding, LeafValue, MerkleError, Node, Record,
};

/// Options applied when building a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeOptions {
    /// Sort leaves by hash before assembling the tree.
    ///
    /// Sorting makes the root independent of input order. Disabling it keeps
    /// leaves in input order, which only matters for callers that need
    /// positional trees.
    pub sort_leaves: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { sort_leaves: true }
    }
}

/// One input record and the position of its leaf in the node array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub value: Record,
    pub tree_index: usize,
}

/// A Merkle tree over ABI-encoded records.
///
/// Nodes are stored in a flat heap-ordered array (see [`crate::node`]); the
/// root is `nodes()[0]`. Entries keep their input order, each pointing at its
/// own leaf, so duplicate records occupy distinct leaves.
///
/// The tree is immutable once built and can be shared across threads for
/// concurrent proof generation.
#[derive(Clone, Debug)]
pub struct StandardMerkleTree<H: Hasher = Keccak256Hasher> {
    /// Hasher instance
    pub(crate) hasher: H,
    /// Flat node array, root first
    pub(crate) tree: Vec<Node>,
    /// Records in input order
    pub(crate) values: Vec<Entry>,
    /// Declared field types
    pub(crate) encoding: LeafEncoding,
    /// Leaf hash -> first entry carrying it
    hash_lookup: HashMap<B256, usize>,
}

impl StandardMerkleTree {
    /// Build a Keccak-256 tree with default options.
    ///
    /// # Example
    /// ```
    /// use standard_merkle_tree::{LeafEncoding, LeafValue, StandardMerkleTree};
    /// use standard_merkle_tree::Address;
    ///
    /// let values = vec![
    ///     vec![LeafValue::from(Address::repeat_byte(0xaa))],
    ///     vec![LeafValue::from(Address::repeat_byte(0xbb))],
    /// ];
    /// let tree = StandardMerkleTree::of(values, LeafEncoding::address()).unwrap();
    /// let proof = tree.proof(0).unwrap();
    /// assert!(tree.verify(tree.value(0).unwrap(), &proof));
    /// ```
    pub fn of(values: Vec<Record>, encoding: LeafEncoding) -> Result<Self> {
        Self::build(Keccak256Hasher, values, encoding, TreeOptions::default())
    }
}

impl<H: Hasher> StandardMerkleTree<H> {
    /// Assemble a tree from parts already checked for consistency.
    pub(crate) fn from_parts(
        hasher: H,
        tree: Vec<Node>,
        values: Vec<Entry>,
        encoding: LeafEncoding,
    ) -> Self {
        let mut hash_lookup = HashMap::with_capacity(values.len());
        for (i, entry) in values.iter().enumerate() {
            hash_lookup.entry(tree[entry.tree_index]).or_insert(i);
        }

        Self {
            hasher,
            tree,
            values,
            encoding,
            hash_lookup,
        }
    }

    /// The root hash.
    pub fn root(&self) -> B256 {
        self.tree[0]
    }

    /// The hasher used by this tree.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// The declared leaf encoding.
    pub fn leaf_encoding(&self) -> &LeafEncoding {
        &self.encoding
    }

    /// The flat node array, root first.
    pub fn nodes(&self) -> &[Node] {
        &self.tree
    }

    /// Number of entries (leaves).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: trees are never built empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(entry_index, record)` in input order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &Record)> + '_ {
        self.values.iter().enumerate().map(|(i, e)| (i, &e.value))
    }

    /// Record at an entry index.
    pub fn value(&self, index: usize) -> Result<&Record> {
        self.entry(index).map(|e| &e.value)
    }

    /// Leaf position of an entry in the node array.
    pub fn tree_index(&self, index: usize) -> Result<usize> {
        self.entry(index).map(|e| e.tree_index)
    }

    pub(crate) fn entry(&self, index: usize) -> Result<&Entry> {
        self.values.get(index).ok_or(MerkleError::IndexOutOfRange(index))
    }

    /// Leaf hash of a record under this tree's encoding and hasher.
    pub fn leaf_hash(&self, record: &[LeafValue]) -> Result<B256> {
        self.encoding.leaf_hash(&self.hasher, record)
    }

    /// Entry index of the first occurrence of a record.
    ///
    /// # Errors
    ///
    /// [`MerkleError::Encoding`] if the record does not match the encoding,
    /// [`MerkleError::RecordNotFound`] if it is not in the tree.
    pub fn leaf_lookup(&self, record: &[LeafValue]) -> Result<usize> {
        let leaf = self.leaf_hash(record)?;
        self.hash_lookup
            .get(&leaf)
            .copied()
            .ok_or(MerkleError::RecordNotFound)
    }

    /// Check whether a record is in the tree.
    pub fn contains(&self, record: &[LeafValue]) -> bool {
        self.leaf_lookup(record).is_ok()
    }
}
