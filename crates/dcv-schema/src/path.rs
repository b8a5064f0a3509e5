//! # Dotted Path Resolution
//!
//! Resolves paths such as `"address.street"` against a document schema.
//! Object properties are descended into directly; arrays whose `items` are
//! objects are transparent (`"tags.label"` reaches `tags.items.properties.label`).
//! Any other container stops resolution. A path either names a property or
//! resolves to nothing; there is no partial result.

use serde_json::Value;

use crate::definition::{ArrayItems, PropertyDefinition, SchemaNode};

/// Resolve `path` against the `properties` of `schema`.
pub fn resolve_property<'a>(schema: &'a Value, path: &str) -> Option<PropertyDefinition<'a>> {
    let mut current = PropertyDefinition::new(schema);
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let property = current.property(segment)?;
        if segments.peek().is_none() {
            return Some(property);
        }
        current = match property.node() {
            SchemaNode::Object { .. } => property,
            SchemaNode::Array { items: ArrayItems::Homogeneous(items), .. } if items.is_object() => items,
            _ => return None,
        };
    }

    None
}
