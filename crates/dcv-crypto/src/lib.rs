//! # dcv-crypto — Cryptographic Primitives
//!
//! - **Ed25519** signing and verification over `CanonicalBytes`, used for
//!   create-transition signatures.
//! - **Contract identifier derivation**: `double_sha256(ownerId || entropy)`,
//!   the cross-node consensus surface for contract ids.
//! - **Entropy generation** from the OS RNG.
//!
//! ## Crate Policy
//!
//! - Depends only on `dcv-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   SHA-256 and real Ed25519.

pub mod contract_id;
pub mod ed25519;

pub use contract_id::{derive_contract_id, generate_entropy, ENTROPY_LENGTH};
pub use ed25519::{verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
