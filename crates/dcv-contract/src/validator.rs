//! # Data Contract Validation Pipeline
//!
//! Validates an untrusted raw contract in four stages. Each stage assumes
//! the previous one passed, so the first stage with errors ends the run and
//! its errors are the result.
//!
//! ```text
//! 1. meta-schema           JsonSchemaValidator::validate_data_contract
//!    protocol version      ProtocolVersionValidator
//! 2. structure             StructureLimiter (depth, $ref hygiene, patterns)
//! 3. document schemas      enrich, check each document type against the
//!                          document meta-schema, then compile it against
//!                          the contract registered as its own $ref root
//! 4. indices               IndexValidator over the enriched contract
//! ```
//!
//! A `ContractError` is returned only for failures that are not about the
//! input: a schema engine that accepted something the contract type cannot
//! represent, or an embedded schema that failed to load.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use dcv_core::{ConsensusError, ValidationConfig, ValidationResult};
use dcv_schema::{
    document_base_schema, JsonSchemaEngine, JsonSchemaValidator, SchemaStructureLimiter,
    StructureLimiter,
};

use crate::contract::DataContract;
use crate::enrich::enrich_with_base_schema;
use crate::error::ContractError;
use crate::index::IndexValidator;
use crate::protocol::ProtocolVersionValidator;

/// The staged contract validator.
pub struct DataContractValidator {
    json_schema_validator: Arc<dyn JsonSchemaValidator>,
    structure_limiter: Arc<dyn StructureLimiter>,
    protocol_version_validator: ProtocolVersionValidator,
    index_validator: IndexValidator,
    base_schema: Value,
}

#[derive(Deserialize)]
struct ProtocolVersionField {
    #[serde(rename = "protocolVersion")]
    protocol_version: u32,
}

impl DataContractValidator {
    /// Validator over explicit collaborators.
    ///
    /// # Errors
    ///
    /// `ContractError::Schema` if the embedded document base schema does not
    /// parse.
    pub fn new(
        json_schema_validator: Arc<dyn JsonSchemaValidator>,
        structure_limiter: Arc<dyn StructureLimiter>,
        config: &ValidationConfig,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            json_schema_validator,
            structure_limiter,
            protocol_version_validator: ProtocolVersionValidator::from_config(config),
            index_validator: IndexValidator::new(),
            base_schema: document_base_schema()?,
        })
    }

    /// Validator over the `jsonschema` engine and the default structure limiter.
    pub fn with_defaults(config: &ValidationConfig) -> Result<Self, ContractError> {
        Self::new(
            Arc::new(JsonSchemaEngine::new()?),
            Arc::new(SchemaStructureLimiter::from_config(config)),
            config,
        )
    }

    /// Latest protocol version this validator accepts.
    pub fn latest_protocol_version(&self) -> u32 {
        self.protocol_version_validator.latest_version()
    }

    /// Run the pipeline over `raw_data_contract`.
    pub fn validate(&self, raw_data_contract: &Value) -> Result<ValidationResult, ContractError> {
        // 1. meta-schema, then protocol version
        let result = self.json_schema_validator.validate_data_contract(raw_data_contract);
        if !result.is_valid() {
            debug!(stage = "meta_schema", error_count = result.errors().len(), "data contract rejected");
            return Ok(result);
        }
        let version = ProtocolVersionField::deserialize(raw_data_contract)?.protocol_version;
        let result = self.protocol_version_validator.validate(version);
        if !result.is_valid() {
            debug!(stage = "protocol_version", protocol_version = version, "data contract rejected");
            return Ok(result);
        }

        // 2. structure
        let result = self.structure_limiter.validate(raw_data_contract);
        if !result.is_valid() {
            debug!(stage = "structure", error_count = result.errors().len(), "data contract rejected");
            return Ok(result);
        }

        // 3. document schemas
        let contract = DataContract::from_raw_object(raw_data_contract)?;
        let enriched = enrich_with_base_schema(&contract, &self.base_schema);
        let result = self.check_document_schemas(&enriched);
        if !result.is_valid() {
            debug!(
                stage = "document_meta_schema",
                contract_id = %enriched.id(),
                error_count = result.errors().len(),
                "data contract rejected"
            );
            return Ok(result);
        }
        let result = self.compile_document_schemas(&enriched);
        if !result.is_valid() {
            debug!(
                stage = "document_schemas",
                contract_id = %enriched.id(),
                error_count = result.errors().len(),
                "data contract rejected"
            );
            return Ok(result);
        }

        // 4. indices
        let result = self.index_validator.validate_with_raw(&enriched, raw_data_contract)?;
        debug!(
            contract_id = %enriched.id(),
            error_count = result.errors().len(),
            "data contract validated"
        );
        Ok(result)
    }

    /// Meta-schema violations of every document type, with instance paths
    /// rooted at the contract (`/documents/<type>/...`).
    fn check_document_schemas(&self, enriched: &DataContract) -> ValidationResult {
        let mut result = ValidationResult::new();
        for (document_type, document_schema) in enriched.documents() {
            let prefix = format!("/documents/{}", escape_pointer(document_type));
            let errors = self
                .json_schema_validator
                .validate_document_schema(document_schema)
                .into_errors()
                .into_iter()
                .map(|error| match error {
                    ConsensusError::JsonSchema { instance_path, schema_path, keyword, message } => {
                        ConsensusError::JsonSchema {
                            instance_path: format!("{prefix}{instance_path}"),
                            schema_path,
                            keyword,
                            message,
                        }
                    }
                    other => other,
                });
            result.add_errors(errors);
        }
        result
    }

    fn compile_document_schemas(&self, enriched: &DataContract) -> ValidationResult {
        let uri = enriched.json_schema_id();
        let mut resources = BTreeMap::new();
        resources.insert(uri.clone(), enriched.schema_resource());

        let mut result = ValidationResult::new();
        for document_type in enriched.documents().keys() {
            let reference = json!({ "$ref": format!("{uri}#/documents/{document_type}") });
            // Only compilation matters here; `{}` is not a document.
            if let Err(e) = self.json_schema_validator.validate(&reference, &json!({}), &resources) {
                result.add_error(ConsensusError::JsonSchemaCompilation {
                    document_type: document_type.clone(),
                    message: e.to_string(),
                });
            }
        }
        result
    }
}

fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

impl std::fmt::Debug for DataContractValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataContractValidator")
            .field("protocol_version_validator", &self.protocol_version_validator)
            .finish_non_exhaustive()
    }
}
