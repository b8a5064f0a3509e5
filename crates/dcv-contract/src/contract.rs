//! # Data Contract Entity
//!
//! In-memory form of a data contract. The raw (wire) object is:
//!
//! ```json
//! {
//!   "protocolVersion": 1,
//!   "$id": "<64 hex>",
//!   "$schema": "https://schemas.dcv.dev/meta/data-contract",
//!   "ownerId": "<64 hex>",
//!   "documents": { "<type>": { "type": "object", "properties": { ... } } },
//!   "definitions": { ... }
//! }
//! ```
//!
//! `definitions` is omitted from the raw object when empty. Entropy is
//! carried on the entity while a contract is being created but is never part
//! of the raw object.
//!
//! ## Security Invariant
//!
//! `id` and `owner_id` are fixed at construction; there are no setters.
//! When entropy is known, `id == derive_contract_id(owner_id, entropy)`. The
//! entity does not enforce that equality itself: the create-transition
//! validator re-derives the identifier rather than trusting it.
//!
//! ## Encoded properties
//!
//! [`DataContract::encoded_properties`] is memoized per document type behind
//! a `parking_lot::RwLock`. The scan is pure, so two threads racing on the
//! same document type compute the same map and the second insert is a no-op.
//! Any mutation of `documents` clears the affected entries.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use dcv_core::{sha256_digest, CanonicalBytes, ContentDigest, Entropy, Identifier};
use dcv_schema::{contract_schema_uri, scan_encoded_properties, DATA_CONTRACT_META_SCHEMA_URI};

use crate::error::ContractError;

/// Encoded-property map of one document type: path -> property definition.
pub type EncodedProperties = BTreeMap<String, Value>;

/// A data contract: named document schemas controlled by one identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DataContract {
    protocol_version: u32,
    #[serde(rename = "$id")]
    id: Identifier,
    #[serde(rename = "$schema")]
    schema: String,
    owner_id: Identifier,
    documents: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    definitions: BTreeMap<String, Value>,
    #[serde(skip)]
    entropy: Option<Entropy>,
    #[serde(skip)]
    encoded_properties: EncodedPropertiesCache,
}

impl DataContract {
    /// Build a contract declaring the current meta-schema and no shared
    /// definitions.
    pub fn new(
        protocol_version: u32,
        id: Identifier,
        owner_id: Identifier,
        documents: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            protocol_version,
            id,
            schema: DATA_CONTRACT_META_SCHEMA_URI.to_string(),
            owner_id,
            documents,
            definitions: BTreeMap::new(),
            entropy: None,
            encoded_properties: EncodedPropertiesCache::default(),
        }
    }

    /// Replace the shared `definitions`.
    pub fn with_definitions(mut self, definitions: BTreeMap<String, Value>) -> Self {
        self.definitions = definitions;
        self.encoded_properties.clear();
        self
    }

    /// Parse a raw contract object.
    ///
    /// # Errors
    ///
    /// `ContractError::Deserialization` if `raw` is not contract-shaped
    /// (missing fields, non-hex identifiers, unknown top-level keys).
    pub fn from_raw_object(raw: &Value) -> Result<Self, ContractError> {
        Ok(Self::deserialize(raw)?)
    }

    /// Serialize back to the raw object form.
    pub fn to_raw_object(&self) -> Result<Value, ContractError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Contract identifier.
    pub fn id(&self) -> Identifier {
        self.id
    }

    /// Identity that controls the contract.
    pub fn owner_id(&self) -> Identifier {
        self.owner_id
    }

    /// Protocol version the contract was written for.
    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Meta-schema URI the contract declares.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Document schemas by type name.
    pub fn documents(&self) -> &BTreeMap<String, Value> {
        &self.documents
    }

    /// Shared sub-schemas referenced as `#/definitions/<name>`.
    pub fn definitions(&self) -> &BTreeMap<String, Value> {
        &self.definitions
    }

    pub fn is_document_defined(&self, document_type: &str) -> bool {
        self.documents.contains_key(document_type)
    }

    /// Schema of one document type.
    ///
    /// # Errors
    ///
    /// `ContractError::InvalidDocumentType` if the type is not declared.
    pub fn document_schema(&self, document_type: &str) -> Result<&Value, ContractError> {
        self.documents
            .get(document_type)
            .ok_or_else(|| ContractError::InvalidDocumentType {
                document_type: document_type.to_string(),
            })
    }

    /// Replace all document schemas.
    pub fn set_documents(&mut self, documents: BTreeMap<String, Value>) {
        self.documents = documents;
        self.encoded_properties.clear();
    }

    /// Insert or replace one document schema.
    pub fn set_document_schema(&mut self, document_type: impl Into<String>, schema: Value) {
        let document_type = document_type.into();
        self.encoded_properties.remove(&document_type);
        self.documents.insert(document_type, schema);
    }

    /// Entropy the identifier was derived from, while it is known.
    pub fn entropy(&self) -> Option<&Entropy> {
        self.entropy.as_ref()
    }

    pub fn set_entropy(&mut self, entropy: Entropy) {
        self.entropy = Some(entropy);
    }

    /// Properties of `document_type` that carry a `contentEncoding` marker.
    ///
    /// Computed on first request and memoized per document type.
    ///
    /// # Errors
    ///
    /// `ContractError::InvalidDocumentType` if the type is not declared.
    pub fn encoded_properties(
        &self,
        document_type: &str,
    ) -> Result<Arc<EncodedProperties>, ContractError> {
        if let Some(cached) = self.encoded_properties.get(document_type) {
            return Ok(cached);
        }
        let scanned = Arc::new(scan_encoded_properties(self.document_schema(document_type)?));
        Ok(self.encoded_properties.insert(document_type, scanned))
    }

    /// URI under which this contract is registered while its document
    /// schemas are compiled.
    pub fn json_schema_id(&self) -> String {
        contract_schema_uri(&self.id)
    }

    /// The part of the contract that document schemas `$ref` into:
    /// `{"documents": ..., "definitions": ...}`.
    ///
    /// `$id` and `$schema` are left out so the resource is resolved relative
    /// to the URI it is registered under.
    pub fn schema_resource(&self) -> Value {
        let documents: Map<String, Value> =
            self.documents.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let definitions: Map<String, Value> =
            self.definitions.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let mut resource = Map::new();
        resource.insert("documents".into(), Value::Object(documents));
        resource.insert("definitions".into(), Value::Object(definitions));
        Value::Object(resource)
    }

    /// SHA-256 over the canonical raw object.
    ///
    /// # Errors
    ///
    /// `ContractError::Canonicalization` if a schema contains a float.
    pub fn content_digest(&self) -> Result<ContentDigest, ContractError> {
        let canonical = CanonicalBytes::new(self)?;
        Ok(sha256_digest(&canonical))
    }
}

impl PartialEq for DataContract {
    fn eq(&self, other: &Self) -> bool {
        self.protocol_version == other.protocol_version
            && self.id == other.id
            && self.schema == other.schema
            && self.owner_id == other.owner_id
            && self.documents == other.documents
            && self.definitions == other.definitions
            && self.entropy == other.entropy
    }
}

/// Per-document-type memo of encoded properties.
///
/// Cloning yields an empty cache; the clone recomputes on demand.
#[derive(Default)]
struct EncodedPropertiesCache {
    entries: RwLock<BTreeMap<String, Arc<EncodedProperties>>>,
}

impl EncodedPropertiesCache {
    fn get(&self, document_type: &str) -> Option<Arc<EncodedProperties>> {
        self.entries.read().get(document_type).cloned()
    }

    /// Store `computed` unless another caller got there first; return the
    /// stored value either way.
    fn insert(&self, document_type: &str, computed: Arc<EncodedProperties>) -> Arc<EncodedProperties> {
        self.entries
            .write()
            .entry(document_type.to_string())
            .or_insert(computed)
            .clone()
    }

    fn remove(&mut self, document_type: &str) {
        self.entries.get_mut().remove(document_type);
    }

    fn clear(&mut self) {
        self.entries.get_mut().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl Clone for EncodedPropertiesCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for EncodedPropertiesCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncodedPropertiesCache({} cached)", self.len())
    }
}
