//! Tree construction from records.

use alloy_primitives::B256;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{error::Result, node::tree_len, Hasher, LeafEncoding, MerkleError, Record};

use super::{Entry, StandardMerkleTree, TreeOptions};

impl<H: Hasher> StandardMerkleTree<H> {
    /// Build a tree with a custom hasher and options.
    ///
    /// Every record is encoded and double-hashed, the `(input_index, leaf)`
    /// pairs are stably sorted by leaf hash (unless `options.sort_leaves` is
    /// off), and the k-th sorted leaf is placed at node index `2n - 2 - k`.
    ///
    /// # Errors
    ///
    /// - [`MerkleError::EmptyTree`] if `values` is empty
    /// - [`MerkleError::Encoding`] if the encoding declares no fields or any
    ///   record does not match it
    pub fn build(
        hasher: H,
        values: Vec<Record>,
        encoding: LeafEncoding,
        options: TreeOptions,
    ) -> Result<Self> {
        if values.is_empty() {
            return Err(MerkleError::EmptyTree);
        }
        if encoding.is_empty() {
            return Err(MerkleError::encoding("leaf encoding declares no fields"));
        }

        let mut hashed = Self::hash_leaves(&hasher, &encoding, &values)?;
        if options.sort_leaves {
            // Stable: duplicates keep their input order
            hashed.sort_by(|a, b| a.1.cmp(&b.1));
        }

        let leaves: Vec<B256> = hashed.iter().map(|(_, leaf)| *leaf).collect();
        let tree = Self::hash_tree(&hasher, &leaves);

        let len = tree_len(values.len());
        let mut tree_indices = vec![0usize; values.len()];
        for (position, (input_index, _)) in hashed.iter().enumerate() {
            tree_indices[*input_index] = len - 1 - position;
        }

        let entries = values
            .into_iter()
            .zip(tree_indices)
            .map(|(value, tree_index)| Entry { value, tree_index })
            .collect();

        let built = Self::from_parts(hasher, tree, entries, encoding);
        tracing::debug!(leaves = built.len(), root = %built.root(), "built merkle tree");
        Ok(built)
    }

    /// Encode and hash every record, keeping its input index.
    #[cfg(not(feature = "parallel"))]
    fn hash_leaves(
        hasher: &H,
        encoding: &LeafEncoding,
        values: &[Record],
    ) -> Result<Vec<(usize, B256)>> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| Ok((i, encoding.leaf_hash(hasher, value)?)))
            .collect()
    }

    /// Encode and hash every record, keeping its input index (parallel version).
    #[cfg(feature = "parallel")]
    fn hash_leaves(
        hasher: &H,
        encoding: &LeafEncoding,
        values: &[Record],
    ) -> Result<Vec<(usize, B256)>> {
        values
            .par_iter()
            .enumerate()
            .map(|(i, value)| Ok((i, encoding.leaf_hash(hasher, value)?)))
            .collect()
    }
}
