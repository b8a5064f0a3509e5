//! # JSON Schema Validation
//!
//! The contract pipeline consumes JSON Schema through the
//! [`JsonSchemaValidator`] trait. [`JsonSchemaEngine`] is the production
//! implementation, backed by the `jsonschema` crate (Draft 7).
//!
//! ## Security Invariant
//!
//! Schema validation is a trust boundary and must be reproducible on every
//! node. The engine therefore never fetches anything: `$ref` targets are
//! served by an in-memory retriever from the schemas the caller registers,
//! and an unknown URI is a compilation failure rather than a network
//! request or a permissive fallback.
//!
//! ## Error mapping
//!
//! - Instance violations become [`ConsensusError::JsonSchema`] values in a
//!   [`ValidationResult`].
//! - A schema that cannot be compiled is an `Err(SchemaValidationError)`;
//!   the caller decides which consensus error that maps to.

use std::collections::{BTreeMap, HashMap};

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

use dcv_core::{ConsensusError, ValidationResult};

use crate::meta::{
    parse_embedded, DATA_CONTRACT_META_SCHEMA, DOCUMENT_META_SCHEMA, DOCUMENT_META_SCHEMA_URI,
};

/// JSON Schema engine consumed by the contract validator.
pub trait JsonSchemaValidator: Send + Sync {
    /// Validate a raw contract against the data-contract meta-schema.
    fn validate_data_contract(&self, raw_data_contract: &Value) -> ValidationResult;

    /// Validate one document schema against the document meta-schema.
    /// Instance paths are relative to the document schema.
    fn validate_document_schema(&self, document_schema: &Value) -> ValidationResult;

    /// Compile `schema` with `additional_schemas` resolvable by URI, then
    /// validate `document` against it.
    ///
    /// # Errors
    ///
    /// `SchemaValidationError::ValidatorBuildError` if `schema` (or anything
    /// it references) does not compile.
    fn validate(
        &self,
        schema: &Value,
        document: &Value,
        additional_schemas: &BTreeMap<String, Value>,
    ) -> Result<ValidationResult, SchemaValidationError>;
}

/// Error building or loading a schema.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// An embedded or supplied schema could not be parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema name or URI.
        schema_name: String,
        /// Why it could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema name or URI.
        schema_name: String,
        /// Engine message.
        reason: String,
    },
}

/// Resolves `$ref` URIs from an in-memory map only.
struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let key = registry_key(uri.as_str());
        self.schemas_by_uri
            .get(key)
            .cloned()
            .ok_or_else(|| format!("schema '{key}' is not registered").into())
    }
}

/// Registered schemas are keyed by URI without fragment.
fn registry_key(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(base, _)| base)
}

/// `jsonschema`-backed [`JsonSchemaValidator`].
///
/// Both meta-schemas are compiled once at construction. Document schemas
/// are compiled per call because every contract brings its own `$ref` root.
///
/// `JsonSchemaEngine` is `Send + Sync` and is shared behind an `Arc`.
pub struct JsonSchemaEngine {
    meta_validator: Validator,
    document_meta_validator: Validator,
}

impl JsonSchemaEngine {
    /// Compile the embedded data-contract and document meta-schemas.
    pub fn new() -> Result<Self, SchemaValidationError> {
        let document_meta = parse_embedded("document-meta.schema.json", DOCUMENT_META_SCHEMA)?;
        let document_meta_validator =
            build_validator("document-meta.schema.json", &document_meta, HashMap::new())?;

        let meta = parse_embedded("data-contract.schema.json", DATA_CONTRACT_META_SCHEMA)?;
        let mut resources = HashMap::new();
        resources.insert(DOCUMENT_META_SCHEMA_URI.to_string(), document_meta);
        let meta_validator = build_validator("data-contract.schema.json", &meta, resources)?;

        Ok(Self { meta_validator, document_meta_validator })
    }
}

impl std::fmt::Debug for JsonSchemaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JsonSchemaEngine(draft7)")
    }
}

impl JsonSchemaValidator for JsonSchemaEngine {
    fn validate_data_contract(&self, raw_data_contract: &Value) -> ValidationResult {
        collect_violations(&self.meta_validator, raw_data_contract)
    }

    fn validate_document_schema(&self, document_schema: &Value) -> ValidationResult {
        collect_violations(&self.document_meta_validator, document_schema)
    }

    fn validate(
        &self,
        schema: &Value,
        document: &Value,
        additional_schemas: &BTreeMap<String, Value>,
    ) -> Result<ValidationResult, SchemaValidationError> {
        let schema_name = schema
            .get("$ref")
            .or_else(|| schema.get("$id"))
            .and_then(Value::as_str)
            .unwrap_or("<inline>")
            .to_string();
        let resources = additional_schemas
            .iter()
            .map(|(uri, value)| (uri.clone(), value.clone()))
            .collect();
        let validator = build_validator(&schema_name, schema, resources)?;
        Ok(collect_violations(&validator, document))
    }
}

fn build_validator(
    schema_name: &str,
    schema: &Value,
    schemas_by_uri: HashMap<String, Value>,
) -> Result<Validator, SchemaValidationError> {
    let mut opts = jsonschema::options();
    opts.with_draft(Draft::Draft7);
    opts.with_retriever(LocalSchemaRetriever { schemas_by_uri });
    opts.build(schema).map_err(|e| SchemaValidationError::ValidatorBuildError {
        schema_name: schema_name.to_string(),
        reason: e.to_string(),
    })
}

fn collect_violations(validator: &Validator, instance: &Value) -> ValidationResult {
    let errors = validator
        .iter_errors(instance)
        .map(|e| {
            let schema_path = e.schema_path.to_string();
            let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
            ConsensusError::JsonSchema {
                instance_path: e.instance_path.to_string(),
                schema_path,
                keyword,
                message: e.to_string(),
            }
        })
        .collect();
    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> JsonSchemaEngine {
        JsonSchemaEngine::new().expect("meta-schema should compile")
    }

    fn keywords(result: &ValidationResult) -> Vec<String> {
        result
            .errors()
            .iter()
            .filter_map(|e| match e {
                ConsensusError::JsonSchema { keyword, .. } => Some(keyword.clone()),
                _ => None,
            })
            .collect()
    }

    // ── inline schemas ──

    #[test]
    fn test_valid_document_passes() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        let result = engine().validate(&schema, &json!({"a": 1}), &BTreeMap::new()).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_violation_carries_paths_and_keyword() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        let result = engine().validate(&schema, &json!({"a": "x"}), &BTreeMap::new()).unwrap();
        match result.first_error() {
            Some(ConsensusError::JsonSchema { instance_path, schema_path, keyword, .. }) => {
                assert_eq!(instance_path, "/a");
                assert_eq!(schema_path, "/properties/a/type");
                assert_eq!(keyword, "type");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // ── registered resources ──

    #[test]
    fn test_ref_into_registered_resource() {
        let uri = "https://schemas.dcv.dev/contracts/test";
        let mut resources = BTreeMap::new();
        resources.insert(
            uri.to_string(),
            json!({
                "documents": {"note": {"type": "object", "properties": {"n": {"$ref": "#/definitions/count"}}}},
                "definitions": {"count": {"type": "integer"}}
            }),
        );
        let schema = json!({"$ref": format!("{uri}#/documents/note")});
        let e = engine();
        assert!(e.validate(&schema, &json!({"n": 3}), &resources).unwrap().is_valid());
        assert!(!e.validate(&schema, &json!({"n": "3"}), &resources).unwrap().is_valid());
    }

    #[test]
    fn test_unregistered_uri_fails_to_compile() {
        let schema = json!({"$ref": "https://schemas.dcv.dev/contracts/missing#/documents/x"});
        let err = engine().validate(&schema, &json!({}), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, SchemaValidationError::ValidatorBuildError { .. }));
    }

    // ── meta-schema ──

    #[test]
    fn test_meta_schema_rejects_missing_documents() {
        let raw = json!({
            "protocolVersion": 1,
            "$schema": "https://schemas.dcv.dev/meta/data-contract",
            "$id": "11".repeat(32),
            "ownerId": "22".repeat(32)
        });
        let result = engine().validate_data_contract(&raw);
        assert_eq!(keywords(&result), vec!["required"]);
    }

    #[test]
    fn test_meta_schema_rejects_non_object() {
        assert!(!engine().validate_data_contract(&Value::Null).is_valid());
    }

    // ── document meta-schema ──

    fn document(property: Value) -> Value {
        json!({
            "type": "object",
            "properties": {"something": property},
            "additionalProperties": false
        })
    }

    fn violation(result: &ValidationResult) -> Option<(String, String)> {
        result.errors().iter().find_map(|e| match e {
            ConsensusError::JsonSchema { instance_path, keyword, .. } => {
                Some((instance_path.clone(), keyword.clone()))
            }
            _ => None,
        })
    }

    #[test]
    fn test_document_schema_accepts_bounded_properties() {
        let e = engine();
        let ok = document(json!({"type": "string", "pattern": "^[a-z]+$", "maxLength": 100}));
        assert!(e.validate_document_schema(&ok).is_valid());
        let bytes = document(json!({"type": "array", "byteArray": true, "maxItems": 64}));
        assert!(e.validate_document_schema(&bytes).is_valid());
        let identifier = document(json!({
            "type": "array",
            "byteArray": true,
            "minItems": 32,
            "maxItems": 32,
            "contentMediaType": "application/x.dash.dpp.identifier"
        }));
        assert!(e.validate_document_schema(&identifier).is_valid());
    }

    #[test]
    fn test_negative_min_length_rejected() {
        let result = engine().validate_document_schema(&document(json!({"type": "string", "minLength": -3})));
        assert_eq!(violation(&result), Some(("/properties/something/minLength".into(), "minimum".into())));
    }

    #[test]
    fn test_unknown_type_name_rejected() {
        let result = engine().validate_document_schema(&document(json!({"type": "strin"})));
        assert!(!result.is_valid());
    }

    #[test]
    fn test_pattern_and_format_need_max_length() {
        let e = engine();
        for property in [
            json!({"type": "string", "pattern": "a"}),
            json!({"type": "string", "format": "uri"}),
        ] {
            let result = e.validate_document_schema(&document(property));
            assert_eq!(violation(&result), Some(("/properties/something".into(), "required".into())));
        }
        let result = e.validate_document_schema(&document(
            json!({"type": "string", "pattern": "a", "maxLength": 60000}),
        ));
        assert_eq!(
            violation(&result),
            Some(("/properties/something/maxLength".into(), "maximum".into()))
        );
    }

    #[test]
    fn test_byte_array_misuse_rejected() {
        let e = engine();
        let cases = [
            json!({"type": "array", "byteArray": 1}),
            json!({"type": "array", "byteArray": false}),
            json!({"type": "string", "byteArray": true}),
            json!({"type": "array", "byteArray": true, "items": {"type": "integer"}}),
        ];
        for property in cases {
            let result = e.validate_document_schema(&document(property.clone()));
            assert!(!result.is_valid(), "accepted {property}");
        }
    }

    #[test]
    fn test_identifier_media_type_needs_32_byte_array() {
        let e = engine();
        let cases = [
            json!({"type": "array", "minItems": 32, "maxItems": 32,
                   "contentMediaType": "application/x.dash.dpp.identifier"}),
            json!({"type": "array", "byteArray": true, "minItems": 31, "maxItems": 32,
                   "contentMediaType": "application/x.dash.dpp.identifier"}),
            json!({"type": "array", "byteArray": true, "minItems": 32, "maxItems": 33,
                   "contentMediaType": "application/x.dash.dpp.identifier"}),
        ];
        for property in cases {
            let result = e.validate_document_schema(&document(property.clone()));
            assert!(!result.is_valid(), "accepted {property}");
        }
    }

    #[test]
    fn test_contract_meta_schema_applies_document_rules() {
        let raw = json!({
            "protocolVersion": 1,
            "$schema": "https://schemas.dcv.dev/meta/data-contract",
            "$id": "11".repeat(32),
            "ownerId": "22".repeat(32),
            "documents": {"note": document(json!({"type": "string", "pattern": "a"}))}
        });
        let result = engine().validate_data_contract(&raw);
        assert_eq!(
            violation(&result),
            Some(("/documents/note/properties/something".into(), "required".into()))
        );
    }

    #[test]
    fn test_registry_key_strips_fragment() {
        assert_eq!(registry_key("https://schemas.dcv.dev/x#/definitions/a"), "https://schemas.dcv.dev/x");
        assert_eq!(registry_key("https://schemas.dcv.dev/x#"), "https://schemas.dcv.dev/x");
        assert_eq!(registry_key("https://schemas.dcv.dev/x"), "https://schemas.dcv.dev/x");
    }
}
