//! Serialized tree documents and proof bundles.
//!
//! The document layout is the one written by OpenZeppelin's
//! `StandardMerkleTree.dump()`, plus an optional `root` field:
//!
//! ```json
//! {
//!   "format": "standard-v1",
//!   "root": "0x…",
//!   "tree": ["0x…", "…"],
//!   "values": [{ "value": ["0x…"], "treeIndex": 2 }],
//!   "leafEncoding": ["address"]
//! }
//! ```
//!
//! `values` keeps input order. Loading trusts nothing: every leaf and internal
//! node is recomputed before the tree is handed back.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    error::Result,
    node::{is_leaf_index, tree_len},
    tree::Entry,
    Hasher, Keccak256Hasher, LeafEncoding, MerkleError, Proof, Record, StandardMerkleTree,
};

/// Format tag written to and required from every document.
pub const STANDARD_FORMAT: &str = "standard-v1";

/// One record of a document and the node index of its leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub value: Vec<JsonValue>,
    pub tree_index: usize,
}

/// Serialized form of a [`StandardMerkleTree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleTreeDocument {
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<B256>,
    pub tree: Vec<B256>,
    pub values: Vec<DocumentEntry>,
    pub leaf_encoding: Vec<String>,
}

impl MerkleTreeDocument {
    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MerkleError::document(e.to_string()))
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MerkleError::document(e.to_string()))
    }
}

impl StandardMerkleTree {
    /// Load a Keccak-256 tree from a document.
    pub fn load(document: &MerkleTreeDocument) -> Result<Self> {
        Self::load_with(Keccak256Hasher, document)
    }
}

impl<H: Hasher> StandardMerkleTree<H> {
    /// Serialize the tree.
    pub fn dump(&self) -> MerkleTreeDocument {
        MerkleTreeDocument {
            format: STANDARD_FORMAT.to_string(),
            root: Some(self.root()),
            tree: self.tree.clone(),
            values: self
                .values
                .iter()
                .map(|e| DocumentEntry {
                    value: e.value.iter().map(|v| v.to_json()).collect(),
                    tree_index: e.tree_index,
                })
                .collect(),
            leaf_encoding: self.encoding.type_names(),
        }
    }

    /// Rebuild a tree from a document with a custom hasher.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::DocumentFormat`] if the format tag is unknown, the
    /// encoding or a value cannot be parsed, the node count does not match the
    /// value count, a tree index is not a distinct leaf position, or any node
    /// does not match the hashes recomputed from the values.
    pub fn load_with(hasher: H, document: &MerkleTreeDocument) -> Result<Self> {
        if document.format != STANDARD_FORMAT {
            return Err(MerkleError::document(format!(
                "unknown format `{}`",
                document.format
            )));
        }

        let encoding = LeafEncoding::parse(&document.leaf_encoding)
            .map_err(|e| MerkleError::document(format!("leaf encoding: {e}")))?;
        if encoding.is_empty() {
            return Err(MerkleError::document("leaf encoding declares no fields"));
        }
        if document.values.is_empty() {
            return Err(MerkleError::document("document has no values"));
        }

        let len = tree_len(document.values.len());
        if document.tree.len() != len {
            return Err(MerkleError::document(format!(
                "expected {len} nodes for {} values, got {}",
                document.values.len(),
                document.tree.len()
            )));
        }

        let mut seen = vec![false; len];
        let mut entries = Vec::with_capacity(document.values.len());
        for (i, raw) in document.values.iter().enumerate() {
            let value = encoding
                .coerce(&raw.value)
                .map_err(|e| MerkleError::document(format!("value {i}: {e}")))?;

            let index = raw.tree_index;
            if !is_leaf_index(len, index) {
                return Err(MerkleError::document(format!(
                    "value {i}: tree index {index} is not a leaf"
                )));
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(MerkleError::document(format!(
                    "value {i}: tree index {index} used twice"
                )));
            }

            let leaf = encoding
                .leaf_hash(&hasher, &value)
                .map_err(|e| MerkleError::document(format!("value {i}: {e}")))?;
            if document.tree[index] != leaf {
                return Err(MerkleError::document(format!(
                    "value {i} does not match leaf at index {index}"
                )));
            }

            entries.push(Entry {
                value,
                tree_index: index,
            });
        }

        Self::check_nodes(&hasher, &document.tree)?;

        if let Some(root) = document.root {
            if root != document.tree[0] {
                return Err(MerkleError::document(format!(
                    "declared root {root} does not match tree root {}",
                    document.tree[0]
                )));
            }
        }

        let tree = Self::from_parts(hasher, document.tree.clone(), entries, encoding);
        tracing::debug!(leaves = tree.len(), root = %tree.root(), "loaded merkle tree");
        Ok(tree)
    }

    /// Proofs for `targets`, each resolved to its first matching entry.
    ///
    /// # Errors
    ///
    /// [`MerkleError::RecordNotFound`] if any target is absent.
    pub fn proof_bundle(&self, targets: &[Record]) -> Result<ProofBundle> {
        let proofs = targets
            .iter()
            .map(|target| {
                let proof = self.proof_by_value(target)?;
                Ok(RecordProof {
                    record: target.iter().map(|v| v.to_json()).collect(),
                    proof,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProofBundle {
            root: self.root(),
            proofs,
        })
    }
}

/// A record and its membership proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordProof {
    pub record: Vec<JsonValue>,
    pub proof: Proof,
}

/// Proofs persisted alongside the root they verify against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub root: B256,
    pub proofs: Vec<RecordProof>,
}

impl ProofBundle {
    /// Verify every proof against the bundle's root.
    ///
    /// Returns the positions of the proofs that fail, including records that
    /// cannot be coerced into `encoding`.
    pub fn failures<H: Hasher>(&self, hasher: &H, encoding: &LeafEncoding) -> Vec<usize> {
        self.proofs
            .iter()
            .enumerate()
            .filter(|(_, p)| match encoding.coerce(&p.record) {
                Ok(record) => !crate::verify(hasher, encoding, &record, &p.proof, &self.root),
                Err(_) => true,
            })
            .map(|(i, _)| i)
            .collect()
    }
}
