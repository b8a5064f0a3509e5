//! # Embedded Schemas
//!
//! The data-contract meta-schema, the document meta-schema and the document
//! base schema ship inside the binary so validation never depends on the
//! filesystem.
//!
//! The document meta-schema is Draft 7 plus the platform's property rules:
//! `pattern` and `format` need a `maxLength` of at most 50 000, `byteArray`
//! is `true` on arrays without `items`, and identifier media types are
//! 32-item byte arrays. The contract meta-schema applies it to every
//! document type and definition.
//!
//! ## URIs
//!
//! - Contracts declare `$schema` = [`DATA_CONTRACT_META_SCHEMA_URI`].
//! - The contract meta-schema reaches the document meta-schema through
//!   [`DOCUMENT_META_SCHEMA_URI`], served from memory.
//! - During document-schema compilation a contract is registered under
//!   [`contract_schema_uri`] so document schemas can `$ref` its
//!   `definitions` (and each other) as `#/definitions/<name>`.
//!
//! These URIs are never dereferenced over the network.

use serde_json::Value;

use dcv_core::Identifier;

use crate::validate::SchemaValidationError;

/// `$schema` value every data contract must declare.
pub const DATA_CONTRACT_META_SCHEMA_URI: &str = "https://schemas.dcv.dev/meta/data-contract";

/// `$id` of the document meta-schema.
pub const DOCUMENT_META_SCHEMA_URI: &str = "https://schemas.dcv.dev/meta/document";

/// Prefix under which contracts are registered for `$ref` resolution.
pub const CONTRACT_SCHEMA_URI_PREFIX: &str = "https://schemas.dcv.dev/contracts/";

pub(crate) const DATA_CONTRACT_META_SCHEMA: &str =
    include_str!("../schemas/data-contract.schema.json");

pub(crate) const DOCUMENT_META_SCHEMA: &str =
    include_str!("../schemas/document-meta.schema.json");

const DOCUMENT_BASE_SCHEMA: &str = include_str!("../schemas/document-base.schema.json");

/// URI under which the contract `id` is registered as a schema resource.
pub fn contract_schema_uri(id: &Identifier) -> String {
    format!("{CONTRACT_SCHEMA_URI_PREFIX}{id}")
}

/// Parsed document base schema (system properties merged into every
/// document type).
pub fn document_base_schema() -> Result<Value, SchemaValidationError> {
    parse_embedded("document-base.schema.json", DOCUMENT_BASE_SCHEMA)
}

pub(crate) fn parse_embedded(name: &str, source: &str) -> Result<Value, SchemaValidationError> {
    serde_json::from_str(source).map_err(|e| SchemaValidationError::SchemaLoadError {
        schema_name: name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}
