//! # Content Digests
//!
//! Two hash entry points, one per kind of preimage:
//!
//! - [`sha256_digest`] takes `&CanonicalBytes`, so structured values can
//!   only be hashed after JCS canonicalization.
//! - [`double_sha256`] takes raw bytes and is reserved for fixed binary
//!   layouts (identifier derivation: `ownerId || entropy`). It is the
//!   platform's content-addressing hash and every node must use it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A SHA-256 digest of canonical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(#[serde(with = "hex")] [u8; 32]);

impl ContentDigest {
    /// The raw 32 digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// SHA-256 over canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&Sha256::digest(data.as_bytes()));
    ContentDigest(bytes)
}

/// `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(first));
    out
}
