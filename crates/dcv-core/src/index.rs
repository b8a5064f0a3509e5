//! # Index Definitions
//!
//! Typed form of an entry in a document schema's `indices` list:
//!
//! ```json
//! { "properties": [{ "$ownerId": "asc" }, { "label": "desc" }], "unique": true }
//! ```
//!
//! Each property entry is a single-key map. Property order defines the
//! composite key and is preserved through (de)serialization, so the
//! serialized property list is a stable, order-sensitive fingerprint.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sort direction of one index property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// One `{name: direction}` entry of an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexProperty {
    /// Dotted property path, or a system property such as `$ownerId`.
    pub name: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl Serialize for IndexProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.direction)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for IndexProperty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, SortDirection>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(D::Error::custom(format!(
                "index property must have exactly one key, got {}",
                map.len()
            )));
        }
        map.into_iter()
            .next()
            .map(|(name, direction)| IndexProperty { name, direction })
            .ok_or_else(|| D::Error::custom("index property is empty"))
    }
}

/// An index declared on a document type.
///
/// `unique` keeps the declared form: an explicit `false` serializes back as
/// `false` and an absent flag stays absent, so error reports echo the index
/// exactly as the contract declared it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Ordered index properties.
    pub properties: Vec<IndexProperty>,
    /// Declared uniqueness flag, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}

impl IndexDefinition {
    /// Whether the index enforces uniqueness. Absent means not unique.
    pub fn is_unique(&self) -> bool {
        self.unique.unwrap_or(false)
    }

    /// Property names in index order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Whether the index spans more than one property.
    pub fn is_compound(&self) -> bool {
        self.properties.len() > 1
    }

    /// If this is a single-property index, that property's name.
    pub fn single_property(&self) -> Option<&str> {
        match self.properties.as_slice() {
            [only] => Some(only.name.as_str()),
            _ => None,
        }
    }

    /// Order- and direction-sensitive fingerprint of the property list.
    ///
    /// This is the compact JSON serialization of `properties`, e.g.
    /// `[{"a":"asc"},{"b":"desc"}]`. Two indices are duplicates exactly when
    /// their fingerprints are equal.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.properties)
    }
}
