//! Leaf encoding: typed records and their Solidity ABI encoding.
//!
//! A tree declares its field types once (e.g. `["address"]` or
//! `["address", "uint256"]`). Every record is a tuple of values matching
//! that declaration and encodes to one 32-byte word per field:
//!
//! | Type      | Word layout                                  |
//! |-----------|----------------------------------------------|
//! | `address` | 12 zero bytes, then the 20 address bytes     |
//! | `bool`    | big-endian `0` or `1`                        |
//! | `uintN`   | big-endian, zero-extended                    |
//! | `intN`    | big-endian two's complement, sign-extended   |
//! | `bytesN`  | the N bytes, then zero padding               |
//!
//! This matches `abi.encode(...)` for static tuples, so leaves can be
//! recomputed inside a contract.

use alloy_primitives::{hex, Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::{error::Result, Hasher, MerkleError};

/// Size of one ABI word in bytes.
pub const WORD_LEN: usize = 32;

/// A static Solidity type usable as a leaf field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AbiType {
    Address,
    Bool,
    /// `uintN`, N in bits
    Uint(u16),
    /// `intN`, N in bits
    Int(u16),
    /// `bytesN`, N in bytes
    FixedBytes(u8),
}

impl AbiType {
    fn parse_bits(s: &str, ty: &str) -> Result<u16> {
        if s.is_empty() {
            return Ok(256);
        }
        match s.parse::<u16>() {
            Ok(bits) if bits % 8 == 0 && (8..=256).contains(&bits) => Ok(bits),
            _ => Err(MerkleError::encoding(format!("invalid bit width in type `{ty}`"))),
        }
    }
}

impl FromStr for AbiType {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self> {
        let ty = s.trim();
        match ty {
            "address" => return Ok(Self::Address),
            "bool" => return Ok(Self::Bool),
            _ => {}
        }
        if let Some(bits) = ty.strip_prefix("uint") {
            return Self::parse_bits(bits, ty).map(Self::Uint);
        }
        if let Some(bits) = ty.strip_prefix("int") {
            return Self::parse_bits(bits, ty).map(Self::Int);
        }
        if let Some(len) = ty.strip_prefix("bytes") {
            if let Ok(len) = len.parse::<u8>() {
                if (1..=32).contains(&len) {
                    return Ok(Self::FixedBytes(len));
                }
            }
        }
        Err(MerkleError::encoding(format!(
            "unsupported leaf type `{ty}`: only static types are allowed"
        )))
    }
}

impl TryFrom<String> for AbiType {
    type Error = MerkleError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AbiType> for String {
    fn from(ty: AbiType) -> Self {
        ty.to_string()
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
        }
    }
}

/// A single field value of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeafValue {
    Address(Address),
    Bool(bool),
    Uint(U256),
    Int(I256),
    Bytes(Bytes),
}

impl LeafValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Bool(_) => "bool",
            Self::Uint(_) => "uint",
            Self::Int(_) => "int",
            Self::Bytes(_) => "bytes",
        }
    }

    /// JSON rendering used in tree documents and proof bundles.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Address(a) => JsonValue::String(a.to_checksum(None)),
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Uint(v) => JsonValue::String(v.to_string()),
            Self::Int(v) => JsonValue::String(v.to_string()),
            Self::Bytes(b) => JsonValue::String(hex::encode_prefixed(b)),
        }
    }
}

impl From<Address> for LeafValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<bool> for LeafValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<U256> for LeafValue {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<u64> for LeafValue {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

impl From<I256> for LeafValue {
    fn from(value: I256) -> Self {
        Self::Int(value)
    }
}

impl From<Bytes> for LeafValue {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

/// One record: an ordered tuple of field values.
pub type Record = Vec<LeafValue>;

/// The field types declared for every record of a tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafEncoding(Vec<AbiType>);

impl LeafEncoding {
    /// Create an encoding from its field types.
    pub fn new(types: Vec<AbiType>) -> Self {
        Self(types)
    }

    /// Parse type names such as `["address", "uint256"]`.
    pub fn parse<S: AsRef<str>>(types: &[S]) -> Result<Self> {
        types
            .iter()
            .map(|t| t.as_ref().parse())
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Encoding for single-address whitelists.
    pub fn address() -> Self {
        Self(vec![AbiType::Address])
    }

    pub fn types(&self) -> &[AbiType] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Type names in canonical form, as stored in tree documents.
    pub fn type_names(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// ABI-encode a record.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::Encoding`] if the arity differs from the declared
    /// types, a value has the wrong type, or a value does not fit its width.
    pub fn encode(&self, record: &[LeafValue]) -> Result<Vec<u8>> {
        if record.len() != self.0.len() {
            return Err(MerkleError::encoding(format!(
                "expected {} fields, got {}",
                self.0.len(),
                record.len()
            )));
        }

        let mut out = Vec::with_capacity(record.len() * WORD_LEN);
        for (field, (ty, value)) in self.0.iter().zip(record).enumerate() {
            let word = encode_word(*ty, value)
                .map_err(|reason| MerkleError::encoding(format!("field {field}: {reason}")))?;
            out.extend_from_slice(&word);
        }
        Ok(out)
    }

    /// Leaf hash of a record: `hash(hash(abi_encode(record)))`.
    pub fn leaf_hash<H: Hasher>(&self, hasher: &H, record: &[LeafValue]) -> Result<B256> {
        let encoded = self.encode(record)?;
        Ok(hasher.hash_leaf(&encoded))
    }

    /// Convert loosely typed JSON values into a record of this encoding.
    pub fn coerce(&self, raw: &[JsonValue]) -> Result<Record> {
        if raw.len() != self.0.len() {
            return Err(MerkleError::encoding(format!(
                "expected {} fields, got {}",
                self.0.len(),
                raw.len()
            )));
        }

        self.0
            .iter()
            .zip(raw)
            .enumerate()
            .map(|(field, (ty, value))| {
                coerce_value(*ty, value)
                    .map_err(|reason| MerkleError::encoding(format!("field {field}: {reason}")))
            })
            .collect()
    }
}

fn encode_word(ty: AbiType, value: &LeafValue) -> std::result::Result<[u8; WORD_LEN], String> {
    let mut word = [0u8; WORD_LEN];
    match (ty, value) {
        (AbiType::Address, LeafValue::Address(a)) => {
            word[12..].copy_from_slice(a.as_slice());
        }
        (AbiType::Bool, LeafValue::Bool(b)) => {
            word[31] = u8::from(*b);
        }
        (AbiType::Uint(bits), LeafValue::Uint(v)) => {
            if v.bit_len() > bits as usize {
                return Err(format!("value {v} does not fit in uint{bits}"));
            }
            word = v.to_be_bytes::<WORD_LEN>();
        }
        (AbiType::Int(bits), LeafValue::Int(v)) => {
            if bits < 256 {
                let bound = U256::from(1u8) << (bits as usize - 1);
                let max = I256::from_raw(bound - U256::from(1u8));
                let min = -I256::from_raw(bound);
                if *v < min || *v > max {
                    return Err(format!("value {v} does not fit in int{bits}"));
                }
            }
            word = v.into_raw().to_be_bytes::<WORD_LEN>();
        }
        (AbiType::FixedBytes(len), LeafValue::Bytes(b)) => {
            if b.len() != len as usize {
                return Err(format!("expected {len} bytes, got {}", b.len()));
            }
            word[..b.len()].copy_from_slice(b);
        }
        (ty, value) => {
            return Err(format!("expected {ty}, got {}", value.kind()));
        }
    }
    Ok(word)
}

fn coerce_value(ty: AbiType, raw: &JsonValue) -> std::result::Result<LeafValue, String> {
    match (ty, raw) {
        (AbiType::Address, JsonValue::String(s)) => Address::from_str(s)
            .map(LeafValue::Address)
            .map_err(|e| format!("invalid address `{s}`: {e}")),
        (AbiType::Bool, JsonValue::Bool(b)) => Ok(LeafValue::Bool(*b)),
        (AbiType::Uint(_), JsonValue::Number(n)) => n
            .as_u64()
            .map(LeafValue::from)
            .ok_or_else(|| format!("invalid unsigned integer {n}")),
        (AbiType::Uint(_), JsonValue::String(s)) => U256::from_str(s)
            .map(LeafValue::Uint)
            .map_err(|e| format!("invalid unsigned integer `{s}`: {e}")),
        (AbiType::Int(_), JsonValue::Number(n)) => n
            .as_i64()
            .and_then(|v| I256::try_from(v).ok())
            .map(LeafValue::Int)
            .ok_or_else(|| format!("invalid signed integer {n}")),
        (AbiType::Int(_), JsonValue::String(s)) => {
            let parsed = if s.trim_start_matches('-').starts_with("0x") {
                I256::from_hex_str(s)
            } else {
                I256::from_dec_str(s)
            };
            parsed
                .map(LeafValue::Int)
                .map_err(|e| format!("invalid signed integer `{s}`: {e}"))
        }
        (AbiType::FixedBytes(_), JsonValue::String(s)) => hex::decode(s)
            .map(|b| LeafValue::Bytes(Bytes::from(b)))
            .map_err(|e| format!("invalid hex `{s}`: {e}")),
        (ty, raw) => Err(format!("expected {ty}, got JSON {raw}")),
    }
}
