//! # Encoded Property Discovery
//!
//! Finds every property that carries a `contentEncoding` marker (binary
//! data transported as a string) and returns a flat `path -> definition`
//! map. Paths use the same dotted form as index properties, plus a
//! positional suffix for tuple arrays:
//!
//! ```text
//! properties.avatar                      -> "avatar"
//! properties.profile.properties.key      -> "profile.key"
//! properties.keys.items.properties.data  -> "keys.data"       (array of objects)
//! properties.pair.items[0]               -> "pair[0]"         (tuple array)
//! ```
//!
//! Container recursion and marker recording are independent checks, so a
//! container that also carries a marker is both recorded and descended into.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::definition::{ArrayItems, PropertyDefinition, SchemaNode};

/// Collect encoded properties of `schema`. Empty when it has no `properties`.
pub fn scan_encoded_properties(schema: &Value) -> BTreeMap<String, Value> {
    let mut found = BTreeMap::new();
    if let Some(properties) = PropertyDefinition::new(schema).properties() {
        let entries = properties.iter().map(|(name, raw)| (name.clone(), raw)).collect();
        collect(entries, "", &mut found);
    }
    found
}

fn collect(entries: Vec<(String, &Value)>, prefix: &str, found: &mut BTreeMap<String, Value>) {
    for (name, raw) in entries {
        let path = format!("{prefix}{name}");
        let property = PropertyDefinition::new(raw);

        match property.node() {
            SchemaNode::Object { properties: Some(children) } => {
                let entries = children.iter().map(|(n, r)| (n.clone(), r)).collect();
                collect(entries, &format!("{path}."), found);
            }
            SchemaNode::Array { items: ArrayItems::Homogeneous(items), .. } if items.is_object() => {
                if let Some(children) = items.properties() {
                    let entries = children.iter().map(|(n, r)| (n.clone(), r)).collect();
                    collect(entries, &format!("{path}."), found);
                }
            }
            SchemaNode::Array { items: ArrayItems::Tuple(elements), .. } => {
                // Element names already carry the full path.
                let entries = elements
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (format!("{path}[{i}]"), r))
                    .collect();
                collect(entries, "", found);
            }
            _ => {}
        }

        if property.content_encoding().is_some() {
            found.insert(path, raw.clone());
        }
    }
}
