//! # Identifiers and Entropy
//!
//! `Identifier` is the 32-byte identifier shared by contracts and
//! identities. Its wire form in raw JSON objects is a 64-character lowercase
//! hex string. `Entropy` is the random byte string mixed into contract
//! identifier derivation; its wire form is hex as well.
//!
//! `Entropy` does not enforce a length at construction. Whether a given
//! entropy is acceptable is a consensus decision made by the transition
//! validator, which must report it as a rule violation rather than fail to
//! parse.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdentifierError;

/// A 32-byte identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; 32]);

impl Identifier {
    /// Byte length of every identifier.
    pub const LENGTH: usize = 32;

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Copy from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifierError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| IdentifierError::InvalidLength {
            expected: Self::LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, IdentifierError> {
        let bytes = hex::decode(s.trim()).map_err(|e| IdentifierError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identifier({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Random bytes used to derive a contract identifier.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entropy(#[serde(with = "hex")] Vec<u8>);

impl Entropy {
    /// Wrap raw bytes without checking their length.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parse a hex string.
    pub fn from_hex(s: &str) -> Result<Self, IdentifierError> {
        hex::decode(s.trim())
            .map(Self)
            .map_err(|e| IdentifierError::InvalidHex(e.to_string()))
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl std::fmt::Debug for Entropy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entropy({} bytes)", self.0.len())
    }
}
