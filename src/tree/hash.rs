//! Internal-node hashing and consistency checks for [`StandardMerkleTree`].

use alloy_primitives::B256;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    error::Result,
    node::{is_internal_index, left_child_index, level_start, right_child_index, tree_len},
    Hasher, MerkleError, Node,
};

use super::StandardMerkleTree;

impl<H: Hasher> StandardMerkleTree<H> {
    /// Lay out `leaves` (in leaf order) and hash every internal node.
    ///
    /// Levels are processed deepest first. Every parent on a level only reads
    /// nodes at higher indices, so one level is a single disjoint write range.
    pub(super) fn hash_tree(hasher: &H, leaves: &[B256]) -> Vec<Node> {
        debug_assert!(!leaves.is_empty());
        let len = tree_len(leaves.len());
        let mut tree = vec![B256::ZERO; len];
        for (i, leaf) in leaves.iter().enumerate() {
            tree[len - 1 - i] = *leaf;
        }

        // Internal nodes are 0..n-1
        let mut end = leaves.len() - 1;
        while end > 0 {
            let start = level_start(end - 1);
            let (parents, children) = tree.split_at_mut(end);
            Self::hash_level(hasher, &mut parents[start..], start, end, children);
            end = start;
        }

        tree
    }

    /// Hash the parents `start..end`, whose children live in `children`
    /// (the node array from index `end` onwards).
    #[cfg(not(feature = "parallel"))]
    fn hash_level(hasher: &H, parents: &mut [Node], start: usize, end: usize, children: &[Node]) {
        for (offset, slot) in parents.iter_mut().enumerate() {
            let i = start + offset;
            *slot = hasher.hash_pair(
                &children[left_child_index(i) - end],
                &children[right_child_index(i) - end],
            );
        }
    }

    /// Hash the parents `start..end` (parallel version).
    #[cfg(feature = "parallel")]
    fn hash_level(hasher: &H, parents: &mut [Node], start: usize, end: usize, children: &[Node]) {
        parents.par_iter_mut().enumerate().for_each(|(offset, slot)| {
            let i = start + offset;
            *slot = hasher.hash_pair(
                &children[left_child_index(i) - end],
                &children[right_child_index(i) - end],
            );
        });
    }

    /// Check that a node array is a well-formed tree: non-empty, complete,
    /// and every internal node equal to the pair hash of its children.
    pub(crate) fn check_nodes(hasher: &H, tree: &[Node]) -> Result<()> {
        if tree.is_empty() || tree.len() % 2 == 0 {
            return Err(MerkleError::document(format!(
                "node array of length {} is not a complete binary tree",
                tree.len()
            )));
        }

        for i in (0..tree.len()).filter(|&i| is_internal_index(tree.len(), i)) {
            let expected =
                hasher.hash_pair(&tree[left_child_index(i)], &tree[right_child_index(i)]);
            if tree[i] != expected {
                return Err(MerkleError::document(format!(
                    "node {i} does not match the hash of its children"
                )));
            }
        }
        Ok(())
    }

    /// Re-derive every leaf and internal node.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::DocumentFormat`] describing the first mismatch.
    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.values.iter().enumerate() {
            let leaf = self.encoding.leaf_hash(&self.hasher, &entry.value)?;
            if self.tree.get(entry.tree_index) != Some(&leaf) {
                return Err(MerkleError::document(format!(
                    "value {i} does not match leaf at index {}",
                    entry.tree_index
                )));
            }
        }
        Self::check_nodes(&self.hasher, &self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keccak256Hasher;

    type Tree = StandardMerkleTree<Keccak256Hasher>;

    fn leaves(n: u8) -> Vec<B256> {
        (1..=n).map(B256::repeat_byte).collect()
    }

    /// Straightforward top-down reference: hash every internal node from the
    /// last one back to the root.
    fn reference(leaves: &[B256]) -> Vec<B256> {
        let hasher = Keccak256Hasher;
        let len = 2 * leaves.len() - 1;
        let mut tree = vec![B256::ZERO; len];
        for (i, leaf) in leaves.iter().enumerate() {
            tree[len - 1 - i] = *leaf;
        }
        for i in (0..leaves.len() - 1).rev() {
            tree[i] = hasher.hash_pair(&tree[2 * i + 1], &tree[2 * i + 2]);
        }
        tree
    }

    #[test]
    fn test_level_hashing_matches_reference() {
        for n in [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 31, 97] {
            let leaves = leaves(n);
            assert_eq!(Tree::hash_tree(&Keccak256Hasher, &leaves), reference(&leaves), "n = {n}");
        }
    }

    #[test]
    fn test_three_leaves_layout() {
        let leaves = leaves(3);
        let tree = Tree::hash_tree(&Keccak256Hasher, &leaves);
        let h = Keccak256Hasher;

        // 0 = H(1, 2), 1 = H(3, 4); leaves at 4, 3, 2 in leaf order
        assert_eq!(tree[4], leaves[0]);
        assert_eq!(tree[3], leaves[1]);
        assert_eq!(tree[2], leaves[2]);
        assert_eq!(tree[1], h.hash_pair(&leaves[1], &leaves[0]));
        assert_eq!(tree[0], h.hash_pair(&tree[1], &leaves[2]));
    }

    #[test]
    fn test_check_nodes_detects_tampering() {
        let mut tree = Tree::hash_tree(&Keccak256Hasher, &leaves(5));
        assert!(Tree::check_nodes(&Keccak256Hasher, &tree).is_ok());

        tree[6] = B256::repeat_byte(0xff);
        assert!(matches!(
            Tree::check_nodes(&Keccak256Hasher, &tree),
            Err(MerkleError::DocumentFormat(_))
        ));
    }

    #[test]
    fn test_check_nodes_rejects_incomplete_arrays() {
        assert!(Tree::check_nodes(&Keccak256Hasher, &[]).is_err());
        assert!(Tree::check_nodes(&Keccak256Hasher, &[B256::ZERO, B256::ZERO]).is_err());
    }
}
