//! # dcv-contract — Data Contracts
//!
//! The data contract entity and everything that decides whether a raw
//! contract is acceptable:
//!
//! - [`DataContract`]: typed contract with a memoized encoded-property view.
//! - [`enrich_with_base_schema`]: folds system properties into document types.
//! - [`ProtocolVersionValidator`]: supported protocol-version range.
//! - [`IndexValidator`]: the index rules, accumulated per document type.
//! - [`DataContractValidator`]: the staged pipeline (meta-schema, structure,
//!   document schemas, indices).
//! - [`DataContractFactory`]: new contracts with derived identifiers.
//!
//! ## Crate Policy
//!
//! - Rule violations are `ConsensusError`s in a `ValidationResult`;
//!   [`ContractError`] is reserved for caller bugs and collaborator failures.
//! - Collaborators (`JsonSchemaValidator`, `StructureLimiter`) are injected
//!   as `Arc<dyn _>` so tests can substitute them.
//! - No `.unwrap()` outside tests.

pub mod contract;
pub mod enrich;
pub mod error;
pub mod factory;
pub mod index;
pub mod protocol;
pub mod validator;

pub use contract::{DataContract, EncodedProperties};
pub use enrich::enrich_with_base_schema;
pub use error::ContractError;
pub use factory::DataContractFactory;
pub use index::{IndexValidator, SYSTEM_PROPERTIES};
pub use protocol::ProtocolVersionValidator;
pub use validator::DataContractValidator;
