//! # dcv-schema — Schema Handling for Data Contracts
//!
//! ## Schema walking
//!
//! - [`definition`]: a borrowed, typed view over a JSON property definition
//!   (`Scalar | Object | Array{Homogeneous | Tuple}`) so the walkers match
//!   exhaustively instead of comparing `type` strings ad hoc.
//! - [`path`]: dotted-path resolution (`"address.street"`) against a
//!   document schema.
//! - [`encoded`]: discovery of properties carrying a `contentEncoding`
//!   marker, flattened to `path -> definition`.
//!
//! ## Validation collaborators
//!
//! - [`validate`]: the [`JsonSchemaValidator`] trait and its
//!   `jsonschema`-backed implementation, [`JsonSchemaEngine`].
//! - [`limits`]: the [`StructureLimiter`] trait and its default
//!   implementation checking nesting depth, `$ref` hygiene and regex
//!   pattern compatibility.
//! - [`meta`]: the embedded data-contract and document meta-schemas and the
//!   document base schema.
//!
//! ## Crate Policy
//!
//! - Depends only on `dcv-core` internally.
//! - Never performs network or file IO for `$ref` resolution; every schema
//!   is resolved from memory.

pub mod definition;
pub mod encoded;
pub mod limits;
pub mod meta;
pub mod path;
pub mod validate;

pub use definition::{ArrayItems, PropertyDefinition, SchemaNode};
pub use encoded::scan_encoded_properties;
pub use limits::{SchemaStructureLimiter, StructureLimiter};
pub use meta::{
    contract_schema_uri, document_base_schema, CONTRACT_SCHEMA_URI_PREFIX,
    DATA_CONTRACT_META_SCHEMA_URI, DOCUMENT_META_SCHEMA_URI,
};
pub use path::resolve_property;
pub use validate::{JsonSchemaEngine, JsonSchemaValidator, SchemaValidationError};
