//! # Consensus Errors
//!
//! The closed set of rule violations a node may report for a data contract
//! or its create transition. Every variant has a stable numeric code, a
//! human message, and named context fields, and serializes to a
//! self-describing JSON object so any node can replay the verdict.
//!
//! ## Code ranges
//!
//! - `1000..=1099` basic / structural rules (protocol version, JSON Schema,
//!   depth and pattern limits, index semantics, identifier integrity).
//! - `2000..=2099` identity and signature rules, produced by the identity
//!   and signature collaborators and merged verbatim.
//!
//! Codes are part of the wire contract. Never renumber a variant.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::identity::Identifier;
use crate::index::IndexDefinition;

/// Coarse grouping of consensus errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    /// Meta-schema, document-schema, protocol version, depth and pattern.
    SchemaStructural,
    /// Rules over `indices` declarations.
    IndexSemantic,
    /// Entropy format and identifier re-derivation.
    IdentifierIntegrity,
    /// Owner identity existence and transition signature.
    IdentitySignature,
}

/// A consensus rule violation.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all_fields = "camelCase")]
pub enum ConsensusError {
    /// Contract protocol version is newer than this node supports.
    #[error("protocol version {parsed_protocol_version} is not supported; latest supported version is {latest_version}")]
    UnsupportedProtocolVersion {
        /// Version declared by the contract.
        parsed_protocol_version: u32,
        /// Highest version this node accepts.
        latest_version: u32,
    },

    /// Contract protocol version is older than this node accepts.
    #[error("protocol version {parsed_protocol_version} is not compatible; minimal supported version is {minimal_protocol_version}")]
    IncompatibleProtocolVersion {
        /// Version declared by the contract.
        parsed_protocol_version: u32,
        /// Lowest version this node accepts.
        minimal_protocol_version: u32,
    },

    /// A document schema could not be compiled.
    #[error("document schema '{document_type}' could not be compiled: {message}")]
    JsonSchemaCompilation {
        /// Document type whose schema failed to compile.
        document_type: String,
        /// Engine message.
        message: String,
    },

    /// A value did not satisfy a JSON Schema.
    #[error("{message} (at '{instance_path}', schema '{schema_path}')")]
    JsonSchema {
        /// JSON pointer into the validated instance.
        instance_path: String,
        /// JSON pointer into the schema.
        schema_path: String,
        /// The failing keyword (last schema path segment).
        keyword: String,
        /// Engine message.
        message: String,
    },

    /// The schema tree nests deeper than allowed.
    #[error("data contract schema depth is greater than {max_depth}")]
    DataContractMaxDepthExceed {
        /// Configured depth limit.
        max_depth: usize,
    },

    /// Two indices of one document type have the same property list.
    #[error("duplicate index definition for document type '{document_type}'")]
    DuplicateIndex {
        /// Raw contract being validated.
        raw_data_contract: Value,
        /// Document type declaring the index.
        document_type: String,
        /// The repeated index.
        index_definition: IndexDefinition,
    },

    /// A `pattern` is not accepted by the restricted regex engine.
    #[error("pattern '{pattern}' at '{path}' is not compatible with the restricted regex engine: {message}")]
    IncompatibleRe2Pattern {
        /// Offending pattern.
        pattern: String,
        /// JSON pointer of the schema declaring the pattern.
        path: String,
        /// Regex engine message.
        message: String,
    },

    /// A compound index mixes required and optional properties.
    #[error("all or none of the properties of a compound index must be required (document type '{document_type}')")]
    InvalidCompoundIndex {
        /// Raw contract being validated.
        raw_data_contract: Value,
        /// Document type declaring the index.
        document_type: String,
        /// Offending index.
        index_definition: IndexDefinition,
    },

    /// The declared contract id does not match the re-derived id.
    #[error("data contract id {invalid_id} does not match the derived id {expected_id}")]
    InvalidDataContractId {
        /// Identifier derived from owner id and entropy.
        expected_id: Identifier,
        /// Identifier declared by the contract.
        invalid_id: Identifier,
    },

    /// An indexed property violates a constraint.
    #[error("indexed property '{property_name}' of document type '{document_type}': {constraint_name} {reason}")]
    InvalidIndexedPropertyConstraint {
        /// Raw contract being validated.
        raw_data_contract: Value,
        /// Document type declaring the index.
        document_type: String,
        /// Offending index.
        index_definition: IndexDefinition,
        /// Offending property.
        property_name: String,
        /// Constraint keyword, e.g. `maxLength`.
        constraint_name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An indexed property has a type that cannot be indexed.
    #[error("property '{property_name}' of type '{property_type}' cannot be indexed (document type '{document_type}')")]
    InvalidIndexPropertyType {
        /// Raw contract being validated.
        raw_data_contract: Value,
        /// Document type declaring the index.
        document_type: String,
        /// Offending index.
        index_definition: IndexDefinition,
        /// Offending property.
        property_name: String,
        /// Its declared type.
        property_type: String,
    },

    /// A `$ref` is circular, unresolvable, or not local.
    #[error("invalid $ref '{reference}': {message}")]
    InvalidJsonSchemaRef {
        /// The reference string.
        reference: String,
        /// What is wrong with it.
        message: String,
    },

    /// A single-property index duplicates a built-in system index.
    #[error("system property '{property_name}' is already indexed (document type '{document_type}')")]
    SystemPropertyIndexAlreadyPresent {
        /// Raw contract being validated.
        raw_data_contract: Value,
        /// Document type declaring the index.
        document_type: String,
        /// Offending index.
        index_definition: IndexDefinition,
        /// The system property.
        property_name: String,
    },

    /// An index names a property the document schema does not define.
    #[error("index property '{property_name}' is not defined in document type '{document_type}'")]
    UndefinedIndexProperty {
        /// Raw contract being validated.
        raw_data_contract: Value,
        /// Document type declaring the index.
        document_type: String,
        /// Offending index.
        index_definition: IndexDefinition,
        /// The missing property path.
        property_name: String,
    },

    /// Too many unique indices on one document type.
    #[error("document type '{document_type}' has more than {index_limit} unique indices")]
    UniqueIndicesLimitReached {
        /// Raw contract being validated.
        raw_data_contract: Value,
        /// Document type declaring the indices.
        document_type: String,
        /// Maximum number of unique indices.
        index_limit: usize,
    },

    /// Transition entropy does not satisfy the format rule.
    #[error("invalid data contract entropy '{entropy}': {reason}")]
    InvalidDataContractEntropy {
        /// Hex of the supplied entropy.
        entropy: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The owner identity does not exist.
    #[error("identity {identity_id} not found")]
    IdentityNotFound {
        /// The missing identity.
        identity_id: Identifier,
    },

    /// The signing key has a type that cannot sign transitions.
    #[error("identity public key type {public_key_type} is not supported for signing")]
    InvalidIdentityPublicKeyType {
        /// Declared key type.
        public_key_type: String,
    },

    /// The transition signature does not verify.
    #[error("invalid state transition signature")]
    InvalidStateTransitionSignature,

    /// The identity has no key with the referenced id.
    #[error("public key {public_key_id} is not present on the identity")]
    MissingPublicKey {
        /// Referenced key id.
        public_key_id: u32,
    },
}

impl ConsensusError {
    /// Stable numeric consensus code.
    pub fn code(&self) -> u32 {
        match self {
            Self::UnsupportedProtocolVersion { .. } => 1002,
            Self::IncompatibleProtocolVersion { .. } => 1003,
            Self::JsonSchemaCompilation { .. } => 1004,
            Self::JsonSchema { .. } => 1005,
            Self::DataContractMaxDepthExceed { .. } => 1007,
            Self::DuplicateIndex { .. } => 1008,
            Self::IncompatibleRe2Pattern { .. } => 1009,
            Self::InvalidCompoundIndex { .. } => 1010,
            Self::InvalidDataContractId { .. } => 1011,
            Self::InvalidIndexedPropertyConstraint { .. } => 1012,
            Self::InvalidIndexPropertyType { .. } => 1013,
            Self::InvalidJsonSchemaRef { .. } => 1014,
            Self::SystemPropertyIndexAlreadyPresent { .. } => 1015,
            Self::UndefinedIndexProperty { .. } => 1016,
            Self::UniqueIndicesLimitReached { .. } => 1017,
            Self::InvalidDataContractEntropy { .. } => 1030,
            Self::IdentityNotFound { .. } => 2000,
            Self::InvalidIdentityPublicKeyType { .. } => 2001,
            Self::InvalidStateTransitionSignature => 2002,
            Self::MissingPublicKey { .. } => 2003,
        }
    }

    /// Which family of rules produced this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedProtocolVersion { .. }
            | Self::IncompatibleProtocolVersion { .. }
            | Self::JsonSchemaCompilation { .. }
            | Self::JsonSchema { .. }
            | Self::DataContractMaxDepthExceed { .. }
            | Self::IncompatibleRe2Pattern { .. }
            | Self::InvalidJsonSchemaRef { .. } => ErrorCategory::SchemaStructural,
            Self::DuplicateIndex { .. }
            | Self::InvalidCompoundIndex { .. }
            | Self::InvalidIndexedPropertyConstraint { .. }
            | Self::InvalidIndexPropertyType { .. }
            | Self::SystemPropertyIndexAlreadyPresent { .. }
            | Self::UndefinedIndexProperty { .. }
            | Self::UniqueIndicesLimitReached { .. } => ErrorCategory::IndexSemantic,
            Self::InvalidDataContractId { .. } | Self::InvalidDataContractEntropy { .. } => {
                ErrorCategory::IdentifierIntegrity
            }
            Self::IdentityNotFound { .. }
            | Self::InvalidIdentityPublicKeyType { .. }
            | Self::InvalidStateTransitionSignature
            | Self::MissingPublicKey { .. } => ErrorCategory::IdentitySignature,
        }
    }

    /// Self-describing report for cross-process transport.
    pub fn report(&self) -> ConsensusErrorReport<'_> {
        ConsensusErrorReport {
            code: self.code(),
            message: self.to_string(),
            error: self,
        }
    }
}

/// Serialized form of a [`ConsensusError`]: `code`, `message`, then the
/// variant `name` and its fields.
#[derive(Debug, Serialize)]
pub struct ConsensusErrorReport<'a> {
    /// Numeric consensus code.
    pub code: u32,
    /// Human-readable message.
    pub message: String,
    /// The error itself, flattened into the report.
    #[serde(flatten)]
    pub error: &'a ConsensusError,
}
