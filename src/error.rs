//! Error types for the merkle tree crate.

use thiserror::Error;

/// Errors that can occur while building, querying or loading a tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A record does not match the declared leaf encoding
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A tree needs at least one record
    #[error("cannot build a merkle tree from zero records")]
    EmptyTree,

    /// Proof requested for a record absent from the tree
    #[error("record not found in tree")]
    RecordNotFound,

    /// Index does not name a leaf (tree index) or an entry (value index)
    #[error("index {0} is out of range")]
    IndexOutOfRange(usize),

    /// The same leaf was requested twice in a multi-proof
    #[error("cannot prove duplicated index {0}")]
    DuplicateIndex(usize),

    /// Structurally invalid proof
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// Corrupt or incompatible serialized tree
    #[error("invalid tree document: {0}")]
    DocumentFormat(String),
}

impl MerkleError {
    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub(crate) fn document(msg: impl Into<String>) -> Self {
        Self::DocumentFormat(msg.into())
    }
}

/// Result type alias for merkle tree operations.
pub type Result<T> = std::result::Result<T, MerkleError>;
