//! # Transition Errors
//!
//! Hard failures while validating a create transition. A rejected
//! transition is not an error: it is a verdict whose `ValidationResult`
//! holds the consensus errors.

use thiserror::Error;

use dcv_contract::ContractError;
use dcv_core::CanonicalizationError;

/// Failure of a state repository backend.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The backend could not be reached or answered with an error.
    #[error("state repository unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while building or validating a create transition.
#[derive(Error, Debug)]
pub enum TransitionError {
    /// Contract parsing or pipeline failure not caused by the input's rules.
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),

    /// A collaborator's repository call failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Signable bytes could not be produced.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The transition does not have the expected JSON shape.
    #[error("transition (de)serialization failed: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A transition was requested for a contract whose entropy is unknown.
    #[error("data contract {contract_id} carries no entropy")]
    MissingEntropy {
        /// Hex identifier of the contract.
        contract_id: String,
    },
}
