//! # Index Rules
//!
//! Checks the `indices` declared by every document type. Within a document
//! type all rules are evaluated and every violation is collected; nothing
//! short-circuits except that an index naming an undefined property skips
//! its own remaining checks.
//!
//! Per index, in declaration order:
//!
//! 1. **Unique cap.** More than [`UNIQUE_INDEX_LIMIT`] unique indices is
//!    reported once per document type, at the first index over the cap.
//! 2. **Redundant system index.** `$id` alone is already indexed.
//! 3. **Existence.** Every non-system property must resolve in the schema.
//! 4. **Indexable type.** No objects, no arrays of containers (byte arrays
//!    excepted), and strings must declare a `maxLength` of at most
//!    [`MAX_INDEXED_STRING_PROPERTY_LENGTH`].
//! 5. **Compound consistency.** A multi-property index lists either only
//!    required properties or only optional ones.
//! 6. **Duplicate.** The compact JSON of the property list (names and
//!    directions, in order) must not repeat within the document type. An
//!    index skipped at step 3 never enters the fingerprint set.
//!
//! Run this over the enriched contract so that system properties appear in
//! `properties` and `required`.

use std::collections::HashSet;

use serde_json::Value;
use tracing::trace;

use dcv_core::{
    ConsensusError, IndexDefinition, ValidationResult, MAX_INDEXED_STRING_PROPERTY_LENGTH,
    UNIQUE_INDEX_LIMIT,
};
use dcv_schema::{resolve_property, ArrayItems, PropertyDefinition, SchemaNode};

use crate::contract::DataContract;
use crate::error::ContractError;

/// Properties every document has without declaring them.
pub const SYSTEM_PROPERTIES: [&str; 4] = ["$id", "$ownerId", "$createdAt", "$updatedAt"];

/// Validates the `indices` of every document type in a contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexValidator;

impl IndexValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `contract`, reporting its own raw object in error context.
    pub fn validate(&self, contract: &DataContract) -> Result<ValidationResult, ContractError> {
        let raw = contract.to_raw_object()?;
        self.validate_with_raw(contract, &raw)
    }

    /// Validate `contract`, reporting `raw_data_contract` (normally the
    /// un-enriched input) in error context.
    ///
    /// # Errors
    ///
    /// `ContractError::Deserialization` if an `indices` list is not a list
    /// of index definitions. The meta-schema rules that out for validated
    /// input.
    pub fn validate_with_raw(
        &self,
        contract: &DataContract,
        raw_data_contract: &Value,
    ) -> Result<ValidationResult, ContractError> {
        let mut result = ValidationResult::new();
        for (document_type, document_schema) in contract.documents() {
            let Some(indices) = document_schema.get("indices") else {
                continue;
            };
            let indices: Vec<IndexDefinition> = serde_json::from_value(indices.clone())?;
            let checker = DocumentIndices {
                raw_data_contract,
                document_type,
                document_schema,
            };
            result.merge(checker.validate(&indices)?);
        }
        Ok(result)
    }
}

/// Error context shared by every check on one document type.
struct DocumentIndices<'a> {
    raw_data_contract: &'a Value,
    document_type: &'a str,
    document_schema: &'a Value,
}

impl<'a> DocumentIndices<'a> {
    fn validate(&self, indices: &[IndexDefinition]) -> Result<ValidationResult, ContractError> {
        let mut result = ValidationResult::new();
        let mut fingerprints = HashSet::new();
        let mut unique_count = 0usize;
        let mut limit_reported = false;

        for index in indices {
            trace!(
                document_type = self.document_type,
                index_unique = index.is_unique(),
                property_count = index.properties.len(),
                "checking index"
            );

            if index.is_unique() {
                unique_count += 1;
                if unique_count > UNIQUE_INDEX_LIMIT && !limit_reported {
                    limit_reported = true;
                    result.add_error(ConsensusError::UniqueIndicesLimitReached {
                        raw_data_contract: self.raw_data_contract.clone(),
                        document_type: self.document_type.to_string(),
                        index_limit: UNIQUE_INDEX_LIMIT,
                    });
                }
            }

            if index.single_property() == Some("$id") {
                result.add_error(ConsensusError::SystemPropertyIndexAlreadyPresent {
                    raw_data_contract: self.raw_data_contract.clone(),
                    document_type: self.document_type.to_string(),
                    index_definition: index.clone(),
                    property_name: "$id".to_string(),
                });
            }

            let mut resolved = Vec::new();
            let mut undefined = false;
            for name in index.property_names().filter(|n| !SYSTEM_PROPERTIES.contains(n)) {
                match resolve_property(self.document_schema, name) {
                    Some(definition) => resolved.push((name, definition)),
                    None => {
                        undefined = true;
                        result.add_error(ConsensusError::UndefinedIndexProperty {
                            raw_data_contract: self.raw_data_contract.clone(),
                            document_type: self.document_type.to_string(),
                            index_definition: index.clone(),
                            property_name: name.to_string(),
                        });
                    }
                }
            }
            if undefined {
                continue;
            }

            for (name, definition) in resolved {
                result.add_errors(self.check_property_type(index, name, definition));
            }

            if index.is_compound() {
                let schema = PropertyDefinition::new(self.document_schema);
                let required = index.property_names().filter(|n| schema.is_required(n)).count();
                if required > 0 && required < index.properties.len() {
                    result.add_error(ConsensusError::InvalidCompoundIndex {
                        raw_data_contract: self.raw_data_contract.clone(),
                        document_type: self.document_type.to_string(),
                        index_definition: index.clone(),
                    });
                }
            }

            if !fingerprints.insert(index.fingerprint()?) {
                result.add_error(ConsensusError::DuplicateIndex {
                    raw_data_contract: self.raw_data_contract.clone(),
                    document_type: self.document_type.to_string(),
                    index_definition: index.clone(),
                });
            }
        }

        Ok(result)
    }

    fn check_property_type(
        &self,
        index: &IndexDefinition,
        property_name: &str,
        definition: PropertyDefinition<'_>,
    ) -> Vec<ConsensusError> {
        let invalid_type = |property_type: &str| ConsensusError::InvalidIndexPropertyType {
            raw_data_contract: self.raw_data_contract.clone(),
            document_type: self.document_type.to_string(),
            index_definition: index.clone(),
            property_name: property_name.to_string(),
            property_type: property_type.to_string(),
        };
        let invalid_constraint = |reason: String| ConsensusError::InvalidIndexedPropertyConstraint {
            raw_data_contract: self.raw_data_contract.clone(),
            document_type: self.document_type.to_string(),
            index_definition: index.clone(),
            property_name: property_name.to_string(),
            constraint_name: "maxLength".to_string(),
            reason,
        };

        match definition.node() {
            SchemaNode::Object { .. } => vec![invalid_type("object")],
            SchemaNode::Array { byte_array: true, .. } => Vec::new(),
            SchemaNode::Array { items, .. } => match items {
                ArrayItems::Tuple(_) => vec![invalid_type("array")],
                ArrayItems::Homogeneous(items)
                    if matches!(items.type_name(), Some("object" | "array")) =>
                {
                    vec![invalid_type("array")]
                }
                _ => Vec::new(),
            },
            SchemaNode::Scalar { type_name: Some("string") } => match definition.max_length() {
                None => vec![invalid_constraint("should be set".to_string())],
                Some(max) if max > MAX_INDEXED_STRING_PROPERTY_LENGTH => vec![invalid_constraint(
                    format!("should be less or equal {MAX_INDEXED_STRING_PROPERTY_LENGTH}"),
                )],
                Some(_) => Vec::new(),
            },
            SchemaNode::Scalar { .. } => Vec::new(),
        }
    }
}
