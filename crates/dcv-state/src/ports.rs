//! # Collaborator Ports
//!
//! The transition validator reaches outside the pure pipeline through these
//! traits only. Each returns consensus errors in a `ValidationResult` that
//! the validator merges verbatim; `Err` is reserved for the backend itself
//! failing.

use async_trait::async_trait;

use dcv_core::{Identifier, ValidationResult};

use crate::error::{RepositoryError, TransitionError};
use crate::identity::Identity;
use crate::transition::DataContractCreateTransition;

/// Read access to platform state.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// The identity with `id`, or `None` if it does not exist.
    async fn fetch_identity(&self, id: &Identifier) -> Result<Option<Identity>, RepositoryError>;
}

/// Checks that the contract owner is a registered identity.
#[async_trait]
pub trait IdentityExistenceChecker: Send + Sync {
    async fn exists(&self, owner_id: &Identifier) -> Result<ValidationResult, TransitionError>;
}

/// Checks the transition signature against the owner's registered key.
#[async_trait]
pub trait TransitionSignatureVerifier: Send + Sync {
    async fn verify(
        &self,
        transition: &DataContractCreateTransition,
        owner_id: &Identifier,
    ) -> Result<ValidationResult, TransitionError>;
}
