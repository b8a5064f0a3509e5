//! # Contract Errors
//!
//! Hard failures of the contract layer. Rule violations found in untrusted
//! input are never reported here; they are `ConsensusError`s inside a
//! `ValidationResult`. A `ContractError` means the caller asked for
//! something that cannot be answered (an undeclared document type, a value
//! that does not deserialize) or that a collaborator could not be built.

use thiserror::Error;

use dcv_core::{CanonicalizationError, ValidationResult};
use dcv_schema::SchemaValidationError;

/// Errors raised by the contract entity, validators and factory.
#[derive(Error, Debug)]
pub enum ContractError {
    /// An accessor was called for a document type the contract does not declare.
    #[error("document type '{document_type}' is not declared in the data contract")]
    InvalidDocumentType {
        /// The requested document type.
        document_type: String,
    },

    /// The raw object does not have the data contract shape.
    #[error("data contract (de)serialization failed: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The factory was asked to build a contract that failed validation.
    #[error("data contract is invalid ({} consensus error(s))", .0.errors().len())]
    InvalidDataContract(ValidationResult),

    /// An embedded schema could not be loaded or a validator could not be built.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaValidationError),

    /// The contract could not be canonicalized for hashing.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
