//! End-to-end runs of the contract validation pipeline.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dcv_contract::{ContractError, DataContract, DataContractFactory, DataContractValidator};
use dcv_core::{ConsensusError, Entropy, Identifier, ValidationConfig, ValidationResult};
use dcv_crypto::derive_contract_id;
use dcv_schema::{
    JsonSchemaEngine, JsonSchemaValidator, SchemaStructureLimiter, SchemaValidationError,
    DATA_CONTRACT_META_SCHEMA_URI,
};
use serde_json::{json, Value};

// ── fixtures ──

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn documents() -> Value {
    json!({
        "niceDocument": {
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "additionalProperties": false
        },
        "indexedDocument": {
            "type": "object",
            "properties": {
                "firstName": {"type": "string", "maxLength": 63},
                "lastName": {"$ref": "#/definitions/lastName"},
                "otherProperty": {"type": "string", "maxLength": 63}
            },
            "required": ["firstName"],
            "indices": [
                {"properties": [{"$ownerId": "asc"}, {"firstName": "desc"}], "unique": true},
                {"properties": [{"$createdAt": "asc"}]},
                {"properties": [{"otherProperty": "asc"}]}
            ],
            "additionalProperties": false
        }
    })
}

fn raw_contract() -> Value {
    json!({
        "protocolVersion": 1,
        "$schema": DATA_CONTRACT_META_SCHEMA_URI,
        "$id": "3f".repeat(32),
        "ownerId": "a0".repeat(32),
        "documents": documents(),
        "definitions": {"lastName": {"type": "string", "maxLength": 63}}
    })
}

fn validator() -> DataContractValidator {
    DataContractValidator::with_defaults(&ValidationConfig::default()).unwrap()
}

fn codes(result: &ValidationResult) -> Vec<u32> {
    result.errors().iter().map(ConsensusError::code).collect()
}

fn set_indices(raw: &mut Value, indices: Value) {
    raw["documents"]["indexedDocument"]["indices"] = indices;
}

/// Passes meta-schema validation through to the real engine but fails every
/// document-schema compilation.
struct FailingCompiler {
    inner: JsonSchemaEngine,
    compile_calls: AtomicUsize,
}

impl JsonSchemaValidator for FailingCompiler {
    fn validate_data_contract(&self, raw_data_contract: &Value) -> ValidationResult {
        self.inner.validate_data_contract(raw_data_contract)
    }

    fn validate_document_schema(&self, document_schema: &Value) -> ValidationResult {
        self.inner.validate_document_schema(document_schema)
    }

    fn validate(
        &self,
        schema: &Value,
        _document: &Value,
        additional_schemas: &BTreeMap<String, Value>,
    ) -> Result<ValidationResult, SchemaValidationError> {
        self.compile_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(additional_schemas.len(), 1);
        Err(SchemaValidationError::ValidatorBuildError {
            schema_name: schema["$ref"].as_str().unwrap_or_default().to_string(),
            reason: "unsupported keyword".into(),
        })
    }
}

/// Accepts every raw contract at stage 1 so later stages see the input.
struct SkipContractMeta {
    inner: JsonSchemaEngine,
}

impl JsonSchemaValidator for SkipContractMeta {
    fn validate_data_contract(&self, _raw_data_contract: &Value) -> ValidationResult {
        ValidationResult::new()
    }

    fn validate_document_schema(&self, document_schema: &Value) -> ValidationResult {
        self.inner.validate_document_schema(document_schema)
    }

    fn validate(
        &self,
        schema: &Value,
        document: &Value,
        additional_schemas: &BTreeMap<String, Value>,
    ) -> Result<ValidationResult, SchemaValidationError> {
        self.inner.validate(schema, document, additional_schemas)
    }
}

fn json_schema_violations(result: &ValidationResult) -> Vec<(&str, &str)> {
    result
        .errors()
        .iter()
        .map(|e| match e {
            ConsensusError::JsonSchema { instance_path, keyword, .. } => {
                (instance_path.as_str(), keyword.as_str())
            }
            other => panic!("unexpected {other:?}"),
        })
        .collect()
}

// ── accepted ──

#[test]
fn test_fixture_contract_is_valid() {
    init_tracing();
    let result = validator().validate(&raw_contract()).unwrap();
    assert!(result.is_valid(), "{:?}", result.errors());
}

#[test]
fn test_exactly_three_unique_indices_accepted() {
    let mut raw = raw_contract();
    set_indices(&mut raw, json!([
        {"properties": [{"firstName": "asc"}], "unique": true},
        {"properties": [{"otherProperty": "asc"}], "unique": true},
        {"properties": [{"$ownerId": "asc"}, {"firstName": "asc"}], "unique": true}
    ]));
    assert!(validator().validate(&raw).unwrap().is_valid());
}

// ── stage 1: meta-schema and protocol version ──

#[test]
fn test_meta_schema_failure_stops_pipeline() {
    let mut raw = raw_contract();
    raw.as_object_mut().unwrap().remove("documents");
    let result = validator().validate(&raw).unwrap();
    assert_eq!(codes(&result), vec![1005]);
}

#[test]
fn test_unsupported_protocol_version() {
    let mut raw = raw_contract();
    raw["protocolVersion"] = json!(2);
    let result = validator().validate(&raw).unwrap();
    assert_eq!(
        result.errors(),
        &[ConsensusError::UnsupportedProtocolVersion { parsed_protocol_version: 2, latest_version: 1 }]
    );
}

#[test]
fn test_incompatible_protocol_version() {
    let config = ValidationConfig { latest_protocol_version: 3, minimum_protocol_version: 2, ..Default::default() };
    let validator = DataContractValidator::with_defaults(&config).unwrap();
    let result = validator.validate(&raw_contract()).unwrap();
    assert_eq!(codes(&result), vec![1003]);
}

// ── stage 2: structure ──

#[test]
fn test_depth_limit_from_config() {
    let config = ValidationConfig { max_schema_depth: 4, ..Default::default() };
    let validator = DataContractValidator::with_defaults(&config).unwrap();
    let result = validator.validate(&raw_contract()).unwrap();
    assert_eq!(result.errors(), &[ConsensusError::DataContractMaxDepthExceed { max_depth: 4 }]);
}

#[test]
fn test_dangling_definition_ref_rejected_before_compilation() {
    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["name"] = json!({"$ref": "#/definitions/nope"});
    let result = validator().validate(&raw).unwrap();
    assert!(matches!(
        result.errors(),
        [ConsensusError::InvalidJsonSchemaRef { reference, .. }] if reference == "#/definitions/nope"
    ));
}

#[test]
fn test_incompatible_pattern_rejected() {
    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["name"] =
        json!({"type": "string", "maxLength": 63, "pattern": "(\\w)\\1"});
    assert_eq!(codes(&validator().validate(&raw).unwrap()), vec![1009]);
}

// ── stage 3: document schemas ──

#[test]
fn test_negative_min_length_rejected() {
    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["name"] = json!({"type": "string", "minLength": -3});
    let result = validator().validate(&raw).unwrap();
    assert_eq!(
        json_schema_violations(&result),
        vec![("/documents/niceDocument/properties/name/minLength", "minimum")]
    );
}

#[test]
fn test_pattern_without_max_length_rejected() {
    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["name"] = json!({"type": "string", "pattern": "^[a-z]+$"});
    let result = validator().validate(&raw).unwrap();
    assert_eq!(
        json_schema_violations(&result),
        vec![("/documents/niceDocument/properties/name", "required")]
    );
}

#[test]
fn test_format_max_length_capped() {
    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["name"] =
        json!({"type": "string", "format": "uri", "maxLength": 60000});
    let result = validator().validate(&raw).unwrap();
    assert_eq!(
        json_schema_violations(&result),
        vec![("/documents/niceDocument/properties/name/maxLength", "maximum")]
    );
}

#[test]
fn test_byte_array_with_items_rejected() {
    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["name"] =
        json!({"type": "array", "byteArray": true, "items": {"type": "integer"}});
    let result = validator().validate(&raw).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors().iter().all(|e| e.code() == 1005));
}

#[test]
fn test_identifier_media_type_requires_byte_array() {
    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["owner"] = json!({
        "type": "array",
        "minItems": 32,
        "maxItems": 32,
        "contentMediaType": "application/x.dash.dpp.identifier"
    });
    let result = validator().validate(&raw).unwrap();
    assert_eq!(
        json_schema_violations(&result),
        vec![("/documents/niceDocument/properties/owner", "required")]
    );

    raw["documents"]["niceDocument"]["properties"]["owner"]["byteArray"] = json!(true);
    assert!(validator().validate(&raw).unwrap().is_valid());
}

#[test]
fn test_enriched_document_checked_against_document_meta_schema() {
    let config = ValidationConfig::default();
    let validator = DataContractValidator::new(
        Arc::new(SkipContractMeta { inner: JsonSchemaEngine::new().unwrap() }),
        Arc::new(SchemaStructureLimiter::from_config(&config)),
        &config,
    )
    .unwrap();

    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["name"] = json!({"type": "string", "pattern": "a"});
    // Duplicate indices would fail stage 4; it must not run.
    set_indices(&mut raw, json!([
        {"properties": [{"firstName": "asc"}]},
        {"properties": [{"firstName": "asc"}]}
    ]));

    let result = validator.validate(&raw).unwrap();
    assert_eq!(
        json_schema_violations(&result),
        vec![("/documents/niceDocument/properties/name", "required")]
    );
}

#[test]
fn test_unknown_type_name_rejected_by_real_engine() {
    let mut raw = raw_contract();
    raw["documents"]["niceDocument"]["properties"]["name"] = json!({"type": "strin"});
    let result = validator().validate(&raw).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors().iter().all(|e| e.code() == 1005));
}

#[test]
fn test_compilation_failure_reported_per_document_type() {
    let engine = Arc::new(FailingCompiler {
        inner: JsonSchemaEngine::new().unwrap(),
        compile_calls: AtomicUsize::new(0),
    });
    let config = ValidationConfig::default();
    let validator = DataContractValidator::new(
        engine.clone(),
        Arc::new(SchemaStructureLimiter::from_config(&config)),
        &config,
    )
    .unwrap();

    // Duplicate indices would fail stage 4; it must not run.
    let mut raw = raw_contract();
    set_indices(&mut raw, json!([
        {"properties": [{"firstName": "asc"}]},
        {"properties": [{"firstName": "asc"}]}
    ]));

    let result = validator.validate(&raw).unwrap();
    let types: Vec<_> = result
        .errors()
        .iter()
        .map(|e| match e {
            ConsensusError::JsonSchemaCompilation { document_type, message } => {
                assert!(message.contains("unsupported keyword"));
                document_type.as_str()
            }
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(types, vec!["indexedDocument", "niceDocument"]);
    assert_eq!(engine.compile_calls.load(Ordering::SeqCst), 2);
}

// ── stage 4: indices ──

#[test]
fn test_four_unique_indices_rejected() {
    let mut raw = raw_contract();
    set_indices(&mut raw, json!([
        {"properties": [{"firstName": "asc"}], "unique": true},
        {"properties": [{"otherProperty": "asc"}], "unique": true},
        {"properties": [{"$ownerId": "asc"}, {"firstName": "asc"}], "unique": true},
        {"properties": [{"$ownerId": "asc"}, {"firstName": "desc"}], "unique": true}
    ]));
    let result = validator().validate(&raw).unwrap();
    assert_eq!(codes(&result), vec![1017]);
}

#[test]
fn test_duplicate_index_rejected() {
    let mut raw = raw_contract();
    set_indices(&mut raw, json!([
        {"properties": [{"firstName": "asc"}]},
        {"properties": [{"firstName": "asc"}], "unique": true}
    ]));
    let result = validator().validate(&raw).unwrap();
    match result.errors() {
        [ConsensusError::DuplicateIndex { raw_data_contract, document_type, index_definition }] => {
            assert_eq!(raw_data_contract, &raw);
            assert_eq!(document_type, "indexedDocument");
            assert!(index_definition.is_unique());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_compound_index_over_required_and_optional_rejected() {
    let mut raw = raw_contract();
    set_indices(&mut raw, json!([{"properties": [{"firstName": "asc"}, {"otherProperty": "asc"}]}]));
    assert_eq!(codes(&validator().validate(&raw).unwrap()), vec![1010]);
}

#[test]
fn test_system_property_in_enriched_required_counts_for_compound() {
    // $ownerId is required by the base schema; $updatedAt is not.
    let mut raw = raw_contract();
    set_indices(&mut raw, json!([{"properties": [{"$ownerId": "asc"}, {"$updatedAt": "asc"}]}]));
    assert_eq!(codes(&validator().validate(&raw).unwrap()), vec![1010]);
}

#[test]
fn test_index_on_definition_ref_needs_no_type_check() {
    let mut raw = raw_contract();
    set_indices(&mut raw, json!([{"properties": [{"lastName": "asc"}]}]));
    assert!(validator().validate(&raw).unwrap().is_valid());
}

#[test]
fn test_unbounded_string_index_rejected() {
    let mut raw = raw_contract();
    raw["documents"]["indexedDocument"]["properties"]["otherProperty"] = json!({"type": "string"});
    let result = validator().validate(&raw).unwrap();
    assert!(matches!(
        result.errors(),
        [ConsensusError::InvalidIndexedPropertyConstraint { property_name, reason, .. }]
            if property_name == "otherProperty" && reason == "should be set"
    ));
}

// ── factory ──

fn factory() -> DataContractFactory {
    DataContractFactory::new(validator())
}

fn document_map() -> BTreeMap<String, Value> {
    serde_json::from_value(documents()).unwrap()
}

#[test]
fn test_factory_contract_derives_id_from_entropy() {
    let owner = Identifier::from_bytes([0xa0; 32]);
    let entropy = Entropy::from_bytes(vec![9; 20]);
    let contract = factory().create_with_entropy(owner, entropy.clone(), document_map());
    assert_eq!(contract.id(), derive_contract_id(&owner, &entropy));
    assert_eq!(contract.entropy(), Some(&entropy));
    assert_eq!(contract.schema(), DATA_CONTRACT_META_SCHEMA_URI);
    assert_eq!(contract.protocol_version(), 1);
}

#[test]
fn test_factory_contract_round_trips_through_validation() {
    let factory = factory();
    let mut contract = factory.create(Identifier::from_bytes([0xa0; 32]), document_map());
    let mut definitions = BTreeMap::new();
    definitions.insert("lastName".to_string(), json!({"type": "string", "maxLength": 63}));
    contract = contract.with_definitions(definitions);

    let raw = contract.to_raw_object().unwrap();
    let rebuilt = factory.create_from_object(&raw, false).unwrap();
    assert_eq!(rebuilt.id(), contract.id());
    assert_eq!(rebuilt.to_raw_object().unwrap(), raw);
    assert!(rebuilt.entropy().is_none());
}

#[test]
fn test_create_from_invalid_object() {
    let mut raw = raw_contract();
    raw["protocolVersion"] = json!(7);
    match factory().create_from_object(&raw, false) {
        Err(ContractError::InvalidDataContract(result)) => assert_eq!(codes(&result), vec![1002]),
        other => panic!("unexpected {other:?}"),
    }
    let unchecked: DataContract = factory().create_from_object(&raw, true).unwrap();
    assert_eq!(unchecked.protocol_version(), 7);
}
