//! Merkle proof generation and verification.
//!
//! Proofs carry sibling hashes only. Because parents are computed with the
//! commutative [`Hasher::hash_pair`], a verifier never needs to know whether
//! the running hash is the left or the right child at a level. This is the
//! format checked by OpenZeppelin `MerkleProof.verify` and
//! `MerkleProof.multiProofVerify`.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::{
    error::Result,
    node::{check_leaf, parent_index, sibling_index},
    Hasher, LeafEncoding, LeafValue, MerkleError, Record, StandardMerkleTree,
};

/// A membership proof: sibling hashes from a leaf up to (excluding) the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof {
    pub siblings: Vec<B256>,
}

impl Proof {
    /// Create a new proof.
    pub fn new(siblings: Vec<B256>) -> Self {
        Self { siblings }
    }

    /// Number of sibling hashes (the leaf's depth).
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// An empty proof only verifies a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Compute the root hash from a leaf and this proof.
    pub fn compute_root<H: Hasher>(&self, hasher: &H, leaf: B256) -> B256 {
        self.siblings
            .iter()
            .fold(leaf, |current, sibling| hasher.hash_pair(&current, sibling))
    }

    /// Verify this proof for a leaf hash against an expected root hash.
    pub fn verify_leaf<H: Hasher>(&self, hasher: &H, leaf: B256, expected_root: &B256) -> bool {
        &self.compute_root(hasher, leaf) == expected_root
    }
}

impl From<Vec<B256>> for Proof {
    fn from(siblings: Vec<B256>) -> Self {
        Self { siblings }
    }
}

/// Verify that `record` is committed to by `root`.
///
/// Needs nothing but the encoding the tree was built with. A record that
/// cannot be encoded is simply not a member, so this returns `false` rather
/// than an error.
pub fn verify<H: Hasher>(
    hasher: &H,
    encoding: &LeafEncoding,
    record: &[LeafValue],
    proof: &Proof,
    root: &B256,
) -> bool {
    match encoding.leaf_hash(hasher, record) {
        Ok(leaf) => proof.verify_leaf(hasher, leaf, root),
        Err(_) => false,
    }
}

/// A proof for several leaves at once.
///
/// `leaves` are listed by descending tree index. `proof_flags[k]` tells step
/// `k` whether its second operand comes from the leaves/computed queue (`true`)
/// or from `proof` (`false`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiProof {
    pub leaves: Vec<B256>,
    pub proof: Vec<B256>,
    pub proof_flags: Vec<bool>,
}

impl MultiProof {
    /// Compute the root implied by this multi-proof.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::InvalidProof`] if the flags, leaves and proof
    /// hashes do not fit together.
    pub fn compute_root<H: Hasher>(&self, hasher: &H) -> Result<B256> {
        Self::process(hasher, &self.leaves, &self.proof, &self.proof_flags)
    }

    /// Verify this multi-proof against an expected root hash.
    pub fn verify<H: Hasher>(&self, hasher: &H, expected_root: &B256) -> bool {
        matches!(self.compute_root(hasher), Ok(root) if &root == expected_root)
    }

    /// Verify that `records` (listed in the same order as `leaves`) are all
    /// committed to by `expected_root`.
    pub fn verify_records<H: Hasher>(
        &self,
        hasher: &H,
        encoding: &LeafEncoding,
        records: &[Record],
        expected_root: &B256,
    ) -> bool {
        let leaves: Result<Vec<B256>> = records
            .iter()
            .map(|r| encoding.leaf_hash(hasher, r))
            .collect();
        match leaves {
            Ok(leaves) => matches!(
                Self::process(hasher, &leaves, &self.proof, &self.proof_flags),
                Ok(root) if &root == expected_root
            ),
            Err(_) => false,
        }
    }

    fn process<H: Hasher>(
        hasher: &H,
        leaves: &[B256],
        proof: &[B256],
        proof_flags: &[bool],
    ) -> Result<B256> {
        let from_proof = proof_flags.iter().filter(|&&f| !f).count();
        if proof.len() < from_proof {
            return Err(MerkleError::InvalidProof(
                "not enough proof hashes for the flags".to_string(),
            ));
        }
        if leaves.len() + proof.len() != proof_flags.len() + 1 {
            return Err(MerkleError::InvalidProof(
                "leaves and proof hashes do not match the number of flags".to_string(),
            ));
        }

        let mut stack: VecDeque<B256> = leaves.iter().copied().collect();
        let mut proof: VecDeque<B256> = proof.iter().copied().collect();
        let exhausted = || MerkleError::InvalidProof("ran out of hashes".to_string());

        for &flag in proof_flags {
            let a = stack.pop_front().ok_or_else(exhausted)?;
            let b = if flag { stack.pop_front() } else { proof.pop_front() }.ok_or_else(exhausted)?;
            stack.push_back(hasher.hash_pair(&a, &b));
        }

        stack
            .pop_back()
            .or_else(|| proof.pop_front())
            .ok_or_else(exhausted)
    }
}

impl<H: Hasher> StandardMerkleTree<H> {
    /// Proof for the leaf at node index `tree_index`.
    ///
    /// # Errors
    ///
    /// [`MerkleError::IndexOutOfRange`] if `tree_index` is not a leaf position.
    pub fn proof_at(&self, tree_index: usize) -> Result<Proof> {
        check_leaf(self.tree.len(), tree_index)?;

        let mut siblings = Vec::new();
        let mut i = tree_index;
        while i > 0 {
            siblings.push(self.tree[sibling_index(i)?]);
            i = parent_index(i)?;
        }
        Ok(Proof::new(siblings))
    }

    /// Proof for the entry at input position `index`.
    pub fn proof(&self, index: usize) -> Result<Proof> {
        self.proof_at(self.tree_index(index)?)
    }

    /// Proof for the first entry equal to `record`.
    ///
    /// # Errors
    ///
    /// [`MerkleError::RecordNotFound`] if no entry matches; use
    /// [`StandardMerkleTree::proof`] to pick a specific duplicate.
    pub fn proof_by_value(&self, record: &[LeafValue]) -> Result<Proof> {
        self.proof(self.leaf_lookup(record)?)
    }

    /// Multi-proof for the entries at input positions `indices`.
    ///
    /// # Errors
    ///
    /// - [`MerkleError::IndexOutOfRange`] for an unknown entry
    /// - [`MerkleError::DuplicateIndex`] if an entry is listed twice
    pub fn multi_proof(&self, indices: &[usize]) -> Result<MultiProof> {
        let mut tree_indices = indices
            .iter()
            .map(|&i| self.tree_index(i))
            .collect::<Result<Vec<_>>>()?;
        tree_indices.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(w) = tree_indices.windows(2).find(|w| w[0] == w[1]) {
            let entry = self.values.iter().position(|e| e.tree_index == w[0]).unwrap_or(w[0]);
            return Err(MerkleError::DuplicateIndex(entry));
        }

        let mut stack: VecDeque<usize> = tree_indices.iter().copied().collect();
        let mut proof = Vec::new();
        let mut proof_flags = Vec::new();

        while let Some(j) = stack.pop_front() {
            if j == 0 {
                stack.push_front(j);
                break;
            }
            let s = sibling_index(j)?;
            if stack.front() == Some(&s) {
                proof_flags.push(true);
                stack.pop_front();
            } else {
                proof_flags.push(false);
                proof.push(self.tree[s]);
            }
            stack.push_back(parent_index(j)?);
        }

        if tree_indices.is_empty() {
            proof.push(self.tree[0]);
        }

        Ok(MultiProof {
            leaves: tree_indices.iter().map(|&i| self.tree[i]).collect(),
            proof,
            proof_flags,
        })
    }

    /// Verify a proof for `record` against this tree's root.
    pub fn verify(&self, record: &[LeafValue], proof: &Proof) -> bool {
        verify(&self.hasher, &self.encoding, record, proof, &self.root())
    }

    /// Verify a multi-proof against this tree's root.
    pub fn verify_multi_proof(&self, proof: &MultiProof) -> bool {
        proof.verify(&self.hasher, &self.root())
    }
}
