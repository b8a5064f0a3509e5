//! # Default Collaborators
//!
//! Repository-backed implementations of the identity and signature ports,
//! plus an in-memory repository for embedding and tests.
//!
//! Signature verification supports Ed25519 identity keys. Other registered
//! key types are reported as `InvalidIdentityPublicKeyType` rather than
//! being silently accepted.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use dcv_core::{ConsensusError, Identifier, ValidationResult};
use dcv_crypto::{verify_with_public_key, Ed25519PublicKey, Ed25519Signature};

use crate::error::{RepositoryError, TransitionError};
use crate::identity::{Identity, KeyType};
use crate::ports::{IdentityExistenceChecker, StateRepository, TransitionSignatureVerifier};
use crate::transition::DataContractCreateTransition;

// ─── In-memory repository ───────────────────────────────────────────

/// Identities held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStateRepository {
    identities: RwLock<HashMap<Identifier, Identity>>,
}

impl InMemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an identity.
    pub fn store_identity(&self, identity: Identity) {
        self.identities.write().insert(identity.id, identity);
    }

    pub fn identity_count(&self) -> usize {
        self.identities.read().len()
    }
}

#[async_trait]
impl StateRepository for InMemoryStateRepository {
    async fn fetch_identity(&self, id: &Identifier) -> Result<Option<Identity>, RepositoryError> {
        Ok(self.identities.read().get(id).cloned())
    }
}

// ─── Identity existence ─────────────────────────────────────────────

/// [`IdentityExistenceChecker`] that looks the owner up in a repository.
pub struct StateRepositoryIdentityChecker {
    repository: Arc<dyn StateRepository>,
}

impl StateRepositoryIdentityChecker {
    pub fn new(repository: Arc<dyn StateRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl IdentityExistenceChecker for StateRepositoryIdentityChecker {
    async fn exists(&self, owner_id: &Identifier) -> Result<ValidationResult, TransitionError> {
        match self.repository.fetch_identity(owner_id).await? {
            Some(_) => Ok(ValidationResult::new()),
            None => Ok(ConsensusError::IdentityNotFound { identity_id: *owner_id }.into()),
        }
    }
}

// ─── Signature verification ─────────────────────────────────────────

/// [`TransitionSignatureVerifier`] that checks the signature against the
/// owner identity's key named by `signaturePublicKeyId`.
pub struct IdentitySignatureVerifier {
    repository: Arc<dyn StateRepository>,
}

impl IdentitySignatureVerifier {
    pub fn new(repository: Arc<dyn StateRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl TransitionSignatureVerifier for IdentitySignatureVerifier {
    async fn verify(
        &self,
        transition: &DataContractCreateTransition,
        owner_id: &Identifier,
    ) -> Result<ValidationResult, TransitionError> {
        let Some(identity) = self.repository.fetch_identity(owner_id).await? else {
            return Ok(ConsensusError::IdentityNotFound { identity_id: *owner_id }.into());
        };

        let key_id = transition.signature_public_key_id();
        let Some(key) = identity.public_key(key_id) else {
            return Ok(ConsensusError::MissingPublicKey { public_key_id: key_id }.into());
        };
        if key.key_type != KeyType::Ed25519 {
            return Ok(ConsensusError::InvalidIdentityPublicKeyType {
                public_key_type: key.key_type.to_string(),
            }
            .into());
        }

        let signable = transition.signable_bytes()?;
        let verified = Ed25519PublicKey::from_slice(&key.data)
            .and_then(|public_key| {
                let signature = Ed25519Signature::from_slice(transition.signature())?;
                verify_with_public_key(&signable, &signature, &public_key)
            });
        match verified {
            Ok(()) => Ok(ValidationResult::new()),
            Err(e) => {
                debug!(key_id, error = %e, "transition signature rejected");
                Ok(ConsensusError::InvalidStateTransitionSignature.into())
            }
        }
    }
}
