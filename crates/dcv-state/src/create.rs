//! # Create-Transition Validation
//!
//! Fail-fast state machine over a [`DataContractCreateTransition`]:
//!
//! ```text
//! UNVALIDATED → SCHEMA_VALID → ENTROPY_VALID → IDENTIFIER_VALID → OWNER_EXISTS → SIGNATURE_VALID
//!      │              │               │                │               │
//!      └──────────────┴───────────────┴────────────────┴───────────────┴──→ REJECTED
//! ```
//!
//! 1. The embedded contract passes the contract pipeline.
//! 2. Entropy is 16 to 20 bytes.
//! 3. `derive_contract_id(ownerId, entropy)` equals the contract's `$id`.
//! 4. The owner identity exists (async collaborator).
//! 5. The signature verifies against the owner's key (async collaborator).
//!
//! Each stage assumes the invariants of the earlier ones, so the first
//! failing stage ends validation and its errors are the verdict's result.
//! Collaborator results are merged verbatim.
//!
//! ## Security Invariant
//!
//! The contract identifier is re-derived, never trusted. Stage 3 runs before
//! any collaborator is called, so a transition with a forged `$id` costs the
//! node no repository or signature work.

use std::sync::Arc;

use tracing::{debug, warn};

use dcv_contract::{DataContract, DataContractValidator};
use dcv_core::{ConsensusError, ValidationResult, MAX_ENTROPY_LENGTH, MIN_ENTROPY_LENGTH};
use dcv_crypto::derive_contract_id;

use crate::error::TransitionError;
use crate::ports::{IdentityExistenceChecker, TransitionSignatureVerifier};
use crate::transition::DataContractCreateTransition;

/// Progress of a create transition through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateTransitionStage {
    /// Nothing checked yet.
    Unvalidated,
    /// The embedded contract passed the contract pipeline.
    SchemaValid,
    /// Entropy has an acceptable length.
    EntropyValid,
    /// The contract `$id` matches the re-derived identifier.
    IdentifierValid,
    /// The owner identity exists.
    OwnerExists,
    /// The signature verifies (terminal, accepted).
    SignatureValid,
    /// A stage failed (terminal).
    Rejected,
}

impl CreateTransitionStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SignatureValid | Self::Rejected)
    }
}

impl std::fmt::Display for CreateTransitionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unvalidated => "UNVALIDATED",
            Self::SchemaValid => "SCHEMA_VALID",
            Self::EntropyValid => "ENTROPY_VALID",
            Self::IdentifierValid => "IDENTIFIER_VALID",
            Self::OwnerExists => "OWNER_EXISTS",
            Self::SignatureValid => "SIGNATURE_VALID",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// One stage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRecord {
    pub from_stage: CreateTransitionStage,
    pub to_stage: CreateTransitionStage,
}

/// Outcome of validating a create transition.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTransitionVerdict {
    stage: CreateTransitionStage,
    result: ValidationResult,
    transition_log: Vec<StageRecord>,
}

impl CreateTransitionVerdict {
    /// Terminal stage: `SignatureValid` or `Rejected`.
    pub fn stage(&self) -> CreateTransitionStage {
        self.stage
    }

    pub fn is_accepted(&self) -> bool {
        self.stage == CreateTransitionStage::SignatureValid
    }

    /// The last stage reached before rejection, if rejected.
    pub fn rejected_after(&self) -> Option<CreateTransitionStage> {
        match self.transition_log.last() {
            Some(record) if record.to_stage == CreateTransitionStage::Rejected => Some(record.from_stage),
            _ => None,
        }
    }

    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn into_result(self) -> ValidationResult {
        self.result
    }

    pub fn transition_log(&self) -> &[StageRecord] {
        &self.transition_log
    }
}

/// Records stage changes while one transition is validated.
struct Run {
    stage: CreateTransitionStage,
    log: Vec<StageRecord>,
}

impl Run {
    fn new() -> Self {
        Self { stage: CreateTransitionStage::Unvalidated, log: Vec::new() }
    }

    fn advance(&mut self, to_stage: CreateTransitionStage) {
        debug!(from = %self.stage, to = %to_stage, "create transition advanced");
        self.log.push(StageRecord { from_stage: self.stage, to_stage });
        self.stage = to_stage;
    }

    fn reject(mut self, result: ValidationResult) -> CreateTransitionVerdict {
        warn!(
            stage = %self.stage,
            error_count = result.errors().len(),
            first_error_code = result.first_error().map(ConsensusError::code),
            "data contract create transition rejected"
        );
        self.log.push(StageRecord { from_stage: self.stage, to_stage: CreateTransitionStage::Rejected });
        CreateTransitionVerdict {
            stage: CreateTransitionStage::Rejected,
            result,
            transition_log: self.log,
        }
    }

    fn accept(mut self) -> CreateTransitionVerdict {
        self.advance(CreateTransitionStage::SignatureValid);
        CreateTransitionVerdict {
            stage: self.stage,
            result: ValidationResult::new(),
            transition_log: self.log,
        }
    }
}

/// Validates [`DataContractCreateTransition`]s.
pub struct DataContractCreateTransitionValidator {
    contract_validator: Arc<DataContractValidator>,
    identity_checker: Arc<dyn IdentityExistenceChecker>,
    signature_verifier: Arc<dyn TransitionSignatureVerifier>,
}

impl DataContractCreateTransitionValidator {
    pub fn new(
        contract_validator: Arc<DataContractValidator>,
        identity_checker: Arc<dyn IdentityExistenceChecker>,
        signature_verifier: Arc<dyn TransitionSignatureVerifier>,
    ) -> Self {
        Self { contract_validator, identity_checker, signature_verifier }
    }

    /// Run all stages, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// A `TransitionError` only when validation could not be carried out
    /// (collaborator backend failure, contract pipeline hard error). Rule
    /// violations are returned as a rejected verdict.
    pub async fn validate(
        &self,
        transition: &DataContractCreateTransition,
    ) -> Result<CreateTransitionVerdict, TransitionError> {
        let mut run = Run::new();

        // 1. embedded contract
        let result = self.contract_validator.validate(transition.data_contract())?;
        if !result.is_valid() {
            return Ok(run.reject(result));
        }
        run.advance(CreateTransitionStage::SchemaValid);

        // 2. entropy
        let entropy = transition.entropy();
        if !(MIN_ENTROPY_LENGTH..=MAX_ENTROPY_LENGTH).contains(&entropy.len()) {
            return Ok(run.reject(
                ConsensusError::InvalidDataContractEntropy {
                    entropy: entropy.to_hex(),
                    reason: format!(
                        "entropy must be {MIN_ENTROPY_LENGTH} to {MAX_ENTROPY_LENGTH} bytes, got {}",
                        entropy.len()
                    ),
                }
                .into(),
            ));
        }
        run.advance(CreateTransitionStage::EntropyValid);

        // 3. identifier
        let contract = DataContract::from_raw_object(transition.data_contract())?;
        let owner_id = contract.owner_id();
        let expected_id = derive_contract_id(&owner_id, entropy);
        if expected_id != contract.id() {
            return Ok(run.reject(
                ConsensusError::InvalidDataContractId {
                    expected_id,
                    invalid_id: contract.id(),
                }
                .into(),
            ));
        }
        run.advance(CreateTransitionStage::IdentifierValid);

        // 4. owner
        let result = self.identity_checker.exists(&owner_id).await?;
        if !result.is_valid() {
            return Ok(run.reject(result));
        }
        run.advance(CreateTransitionStage::OwnerExists);

        // 5. signature
        let result = self.signature_verifier.verify(transition, &owner_id).await?;
        if !result.is_valid() {
            return Ok(run.reject(result));
        }

        debug!(contract_id = %contract.id(), "data contract create transition accepted");
        Ok(run.accept())
    }
}
