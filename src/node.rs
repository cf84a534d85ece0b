//! Node type and heap layout of the flat node array.
//!
//! A tree over `n` leaves is stored as `2n - 1` nodes:
//! - index 0 is the root
//! - children of `i` are `2i + 1` and `2i + 2`
//! - leaves occupy the last `n` slots, `n - 1 ..= 2n - 2`
//!
//! The array is always a complete binary tree, so when `n` is not a power of
//! two the leaves sit on two adjacent levels instead of the last leaf being
//! duplicated.

use alloy_primitives::B256;

use crate::{error::Result, MerkleError};

/// A tree node: a 32-byte digest ordered as a big-endian integer.
pub type Node = B256;

/// Number of nodes in a tree with `leaf_count` leaves (0 for no leaves).
pub const fn tree_len(leaf_count: usize) -> usize {
    leaf_count.saturating_mul(2).saturating_sub(1)
}

/// Index of the left child of `i`.
pub const fn left_child_index(i: usize) -> usize {
    2 * i + 1
}

/// Index of the right child of `i`.
pub const fn right_child_index(i: usize) -> usize {
    2 * i + 2
}

/// Index of the parent of `i`.
///
/// # Errors
///
/// The root has no parent.
pub fn parent_index(i: usize) -> Result<usize> {
    if i == 0 {
        return Err(MerkleError::InvalidProof("root has no parent".to_string()));
    }
    Ok((i - 1) / 2)
}

/// Index of the sibling of `i`: odd indices are left children, even indices
/// (other than the root) are right children.
///
/// # Errors
///
/// The root has no sibling.
pub fn sibling_index(i: usize) -> Result<usize> {
    if i == 0 {
        return Err(MerkleError::InvalidProof("root has no sibling".to_string()));
    }
    Ok(if i % 2 == 1 { i + 1 } else { i - 1 })
}

/// Whether `i` is a leaf of a tree with `len` nodes.
pub const fn is_leaf_index(len: usize, i: usize) -> bool {
    i < len && left_child_index(i) >= len
}

/// Whether `i` is an internal node of a tree with `len` nodes.
pub const fn is_internal_index(len: usize, i: usize) -> bool {
    left_child_index(i) < len
}

/// First index of the level containing `i` (`2^depth - 1`).
pub(crate) const fn level_start(i: usize) -> usize {
    let depth = usize::BITS - 1 - (i + 1).leading_zeros();
    (1 << depth) - 1
}

/// Checks that `i` names a leaf.
pub(crate) fn check_leaf(len: usize, i: usize) -> Result<()> {
    if is_leaf_index(len, i) {
        Ok(())
    } else {
        Err(MerkleError::IndexOutOfRange(i))
    }
}
