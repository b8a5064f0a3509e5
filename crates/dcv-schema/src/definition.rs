//! # Property Definitions
//!
//! A `PropertyDefinition` borrows one JSON object from a document schema
//! and classifies it by its `type` keyword:
//!
//! ```text
//! SchemaNode::Scalar { type_name }            string, integer, number, boolean, ...
//! SchemaNode::Object { properties }           type: object
//! SchemaNode::Array  { items, byte_array }    type: array
//!     ArrayItems::Homogeneous(definition)     items: { ... }
//!     ArrayItems::Tuple(definitions)          items: [ {...}, {...} ]
//!     ArrayItems::Unspecified                 no items keyword
//! ```
//!
//! The raw JSON stays reachable through [`PropertyDefinition::raw`] because
//! the encoded-property view and error reports hand the definition back to
//! callers verbatim.

use serde_json::{Map, Value};

/// Borrowed view over a property definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDefinition<'a> {
    raw: &'a Value,
}

/// Shape of a property definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaNode<'a> {
    /// Any non-container type, or no `type` at all.
    Scalar {
        /// The `type` keyword when it is a single string.
        type_name: Option<&'a str>,
    },
    /// `type: object`.
    Object {
        /// Declared child properties, if any.
        properties: Option<&'a Map<String, Value>>,
    },
    /// `type: array`.
    Array {
        /// Element definitions.
        items: ArrayItems<'a>,
        /// Whether the array is declared as a byte array.
        byte_array: bool,
    },
}

/// Element definitions of an array property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrayItems<'a> {
    /// Every element has the same definition.
    Homogeneous(PropertyDefinition<'a>),
    /// Positional element definitions.
    Tuple(&'a [Value]),
    /// No `items` keyword.
    Unspecified,
}

impl<'a> PropertyDefinition<'a> {
    /// View `raw` as a property definition.
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// The underlying JSON.
    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    /// The `type` keyword when it is a single string.
    pub fn type_name(&self) -> Option<&'a str> {
        self.raw.get("type").and_then(Value::as_str)
    }

    /// Classify this definition.
    pub fn node(&self) -> SchemaNode<'a> {
        match self.type_name() {
            Some("object") => SchemaNode::Object { properties: self.properties() },
            Some("array") => SchemaNode::Array {
                items: match self.raw.get("items") {
                    Some(Value::Array(elements)) => ArrayItems::Tuple(elements),
                    Some(items @ Value::Object(_)) => ArrayItems::Homogeneous(Self::new(items)),
                    _ => ArrayItems::Unspecified,
                },
                byte_array: self.raw.get("byteArray") == Some(&Value::Bool(true)),
            },
            type_name => SchemaNode::Scalar { type_name },
        }
    }

    /// The `properties` map, regardless of `type`.
    ///
    /// Document schemas are walked from their root through this accessor.
    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.raw.get("properties").and_then(Value::as_object)
    }

    /// A single child property.
    pub fn property(&self, name: &str) -> Option<PropertyDefinition<'a>> {
        self.properties()?.get(name).map(Self::new)
    }

    /// Whether `name` is listed in the `required` array.
    pub fn is_required(&self, name: &str) -> bool {
        self.raw
            .get("required")
            .and_then(Value::as_array)
            .is_some_and(|required| required.iter().any(|r| r.as_str() == Some(name)))
    }

    /// The `maxLength` keyword as an unsigned integer.
    pub fn max_length(&self) -> Option<u64> {
        self.raw.get("maxLength").and_then(Value::as_u64)
    }

    /// The `contentEncoding` marker, if present.
    pub fn content_encoding(&self) -> Option<&'a str> {
        self.raw.get("contentEncoding").and_then(Value::as_str)
    }

    /// Whether this is an object-typed definition.
    pub fn is_object(&self) -> bool {
        self.type_name() == Some("object")
    }
}
