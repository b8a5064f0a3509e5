//! # Base-Document Enrichment
//!
//! Every document carries system properties (`$id`, `$ownerId`,
//! `$createdAt`, `$updatedAt`) that contracts do not declare themselves.
//! Before document schemas are compiled and indices are checked, the base
//! schema is folded into each document type:
//!
//! - `properties` = base properties, overlaid by the document's own;
//! - `required` = base `required` followed by the document's, without
//!   repeats and in first-seen order.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::contract::DataContract;

/// Return a copy of `contract` with `base_schema` merged into every
/// document type. The input is left untouched.
pub fn enrich_with_base_schema(contract: &DataContract, base_schema: &Value) -> DataContract {
    let base_properties = base_schema
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let base_required = base_schema
        .get("required")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let documents: BTreeMap<String, Value> = contract
        .documents()
        .iter()
        .map(|(name, schema)| {
            (name.clone(), enrich_document(schema, &base_properties, &base_required))
        })
        .collect();

    let mut enriched = contract.clone();
    enriched.set_documents(documents);
    enriched
}

fn enrich_document(document: &Value, base_properties: &Map<String, Value>, base_required: &[Value]) -> Value {
    let Value::Object(document) = document else {
        return document.clone();
    };
    let mut document = document.clone();

    let mut properties = base_properties.clone();
    if let Some(Value::Object(own)) = document.get("properties") {
        for (name, definition) in own {
            properties.insert(name.clone(), definition.clone());
        }
    }

    let mut required: Vec<Value> = Vec::with_capacity(base_required.len());
    let own_required = match document.get("required") {
        Some(Value::Array(own)) => own.as_slice(),
        _ => &[],
    };
    for name in base_required.iter().chain(own_required) {
        if !required.contains(name) {
            required.push(name.clone());
        }
    }

    document.insert("properties".into(), Value::Object(properties));
    document.insert("required".into(), Value::Array(required));
    Value::Object(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcv_core::Identifier;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "properties": {
                "$id": {"type": "string", "minLength": 64, "maxLength": 64},
                "$ownerId": {"type": "string", "minLength": 64, "maxLength": 64}
            },
            "required": ["$id", "$ownerId"]
        })
    }

    fn contract(document: Value) -> DataContract {
        let mut documents = BTreeMap::new();
        documents.insert("note".to_string(), document);
        DataContract::new(
            1,
            Identifier::from_bytes([1; 32]),
            Identifier::from_bytes([2; 32]),
            documents,
        )
    }

    #[test]
    fn test_properties_and_required_are_merged() {
        let original = contract(json!({
            "type": "object",
            "properties": {"body": {"type": "string"}},
            "required": ["body"]
        }));
        let enriched = enrich_with_base_schema(&original, &base());
        let note = enriched.document_schema("note").unwrap();

        let names: Vec<_> = note["properties"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["$id", "$ownerId", "body"]);
        assert_eq!(note["required"], json!(["$id", "$ownerId", "body"]));
        assert_eq!(note["type"], "object");
    }

    #[test]
    fn test_input_contract_is_untouched() {
        let original = contract(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
        let before = original.clone();
        let _ = enrich_with_base_schema(&original, &base());
        assert_eq!(original, before);
    }

    #[test]
    fn test_document_definition_wins_and_required_is_deduplicated() {
        let original = contract(json!({
            "type": "object",
            "properties": {"$id": {"type": "string", "maxLength": 64, "description": "own"}},
            "required": ["$ownerId", "extra"]
        }));
        let enriched = enrich_with_base_schema(&original, &base());
        let note = enriched.document_schema("note").unwrap();
        assert_eq!(note["properties"]["$id"]["description"], "own");
        assert_eq!(note["required"], json!(["$id", "$ownerId", "extra"]));
    }

    #[test]
    fn test_document_without_required_gets_base_required() {
        let original = contract(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
        let enriched = enrich_with_base_schema(&original, &base());
        assert_eq!(enriched.document_schema("note").unwrap()["required"], json!(["$id", "$ownerId"]));
    }
}
