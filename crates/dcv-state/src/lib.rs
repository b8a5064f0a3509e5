//! # dcv-state — Data Contract Create Transitions
//!
//! Validates the signed state transition that creates a data contract.
//!
//! - **Transition** (`transition.rs`): wire type, signable bytes, signing.
//! - **Identity** (`identity.rs`): identities and their public keys.
//! - **Ports** (`ports.rs`): async collaborator traits (state repository,
//!   identity existence, signature verification).
//! - **Collaborators** (`collaborators.rs`): repository-backed defaults and
//!   an in-memory repository.
//! - **Create** (`create.rs`): the fail-fast stage machine
//!   `UNVALIDATED → SCHEMA_VALID → ENTROPY_VALID → IDENTIFIER_VALID →
//!   OWNER_EXISTS → SIGNATURE_VALID`, with `REJECTED` reachable from every
//!   non-terminal stage.
//!
//! ## Concurrency
//!
//! Only the owner lookup and signature check suspend. Everything before them
//! is synchronous and CPU-bound. Validators hold no per-call state and may
//! be shared across tasks.

pub mod collaborators;
pub mod create;
pub mod error;
pub mod identity;
pub mod ports;
pub mod transition;

pub use collaborators::{
    IdentitySignatureVerifier, InMemoryStateRepository, StateRepositoryIdentityChecker,
};
pub use create::{
    CreateTransitionStage, CreateTransitionVerdict, DataContractCreateTransitionValidator,
    StageRecord,
};
pub use error::{RepositoryError, TransitionError};
pub use identity::{Identity, IdentityPublicKey, KeyType};
pub use ports::{IdentityExistenceChecker, StateRepository, TransitionSignatureVerifier};
pub use transition::DataContractCreateTransition;
