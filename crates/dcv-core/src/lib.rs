//! # dcv-core — Foundational Types for Data Contract Validation
//!
//! Every other crate in the workspace depends on `dcv-core`; it depends on
//! nothing internal. It owns the vocabulary that must be identical on every
//! node: how bytes are canonicalized, how identifiers are encoded, what an
//! index definition looks like, and which consensus errors exist.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every digest and every signature input
//!    flows through `CanonicalBytes::new()` (RFC 8785 JCS with float
//!    rejection). No raw `serde_json::to_vec()` for anything that is hashed.
//!
//! 2. **Newtypes for identifiers.** `Identifier` is 32 bytes with a hex wire
//!    form; `Entropy` is an opaque byte string whose length rule is a
//!    consensus check, not a constructor check.
//!
//! 3. **Closed consensus taxonomy.** `ConsensusError` is a single enum with a
//!    stable numeric code per variant. Rule violations are values collected in
//!    a `ValidationResult`; they are never `Err`.
//!
//! 4. **Hard errors are separate.** Caller bugs (bad hex in a constructor,
//!    unreadable config) use the `thiserror` enums in [`error`] and never mix
//!    with consensus results.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dcv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod config;
pub mod consensus;
pub mod digest;
pub mod error;
pub mod identity;
pub mod index;
pub mod validation;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use config::{
    ValidationConfig, MAX_ENTROPY_LENGTH, MAX_INDEXED_STRING_PROPERTY_LENGTH, MIN_ENTROPY_LENGTH,
    UNIQUE_INDEX_LIMIT,
};
pub use consensus::{ConsensusError, ConsensusErrorReport, ErrorCategory};
pub use digest::{double_sha256, sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ConfigError, CryptoError, IdentifierError};
pub use identity::{Entropy, Identifier};
pub use index::{IndexDefinition, IndexProperty, SortDirection};
pub use validation::ValidationResult;
