//! # Structural Limits
//!
//! Checks a raw contract must pass before any of its schemas are compiled:
//!
//! 1. **Depth.** Local `$ref`s (`#/...`) are expanded in place and the
//!    nesting depth of the resulting tree must not exceed the configured
//!    maximum. A `$ref` that is circular, does not resolve, or is not local
//!    is rejected with `InvalidJsonSchemaRef`. The first failure stops the
//!    walk.
//! 2. **Patterns.** Every string `pattern` keyword must compile under the
//!    `regex` crate, a linear-time engine in the RE2 family used by the
//!    indexing layer. Lookaround and backreferences are therefore rejected.
//!    All incompatible patterns are reported.
//!
//! Patterns are only checked once depth has passed.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use dcv_core::{ConsensusError, ValidationConfig, ValidationResult};

/// Pre-compilation structural checks over a raw contract.
pub trait StructureLimiter: Send + Sync {
    /// Check `raw_data_contract`; empty result means it may be compiled.
    fn validate(&self, raw_data_contract: &Value) -> ValidationResult;
}

/// Default [`StructureLimiter`]: depth and `$ref` hygiene, then patterns.
#[derive(Debug, Clone)]
pub struct SchemaStructureLimiter {
    max_depth: usize,
    pattern_size_limit: usize,
}

impl SchemaStructureLimiter {
    /// Limiter with explicit limits.
    pub fn new(max_depth: usize, pattern_size_limit: usize) -> Self {
        Self { max_depth, pattern_size_limit }
    }

    /// Limiter using `config.max_schema_depth` and `config.pattern_size_limit`.
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(config.max_schema_depth, config.pattern_size_limit)
    }

    /// Depth and `$ref` check only.
    pub fn check_depth(&self, raw_data_contract: &Value) -> ValidationResult {
        let mut walker = DepthWalker {
            root: raw_data_contract,
            max_depth: self.max_depth,
            resolving: Vec::new(),
            heights: HashMap::new(),
        };
        match walker.height(raw_data_contract, 0) {
            Ok(_) => ValidationResult::new(),
            Err(error) => ValidationResult::from(error),
        }
    }

    /// Pattern compatibility check only.
    pub fn check_patterns(&self, raw_data_contract: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();
        self.walk_patterns(raw_data_contract, String::new(), &mut result);
        result
    }

    fn walk_patterns(&self, value: &Value, path: String, result: &mut ValidationResult) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(pattern)) = map.get("pattern") {
                    if let Err(e) = regex::RegexBuilder::new(pattern)
                        .size_limit(self.pattern_size_limit)
                        .build()
                    {
                        result.add_error(ConsensusError::IncompatibleRe2Pattern {
                            pattern: pattern.clone(),
                            path: path.clone(),
                            message: e.to_string(),
                        });
                    }
                }
                for (key, child) in map {
                    self.walk_patterns(child, format!("{path}/{}", escape_pointer(key)), result);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.walk_patterns(child, format!("{path}/{i}"), result);
                }
            }
            _ => {}
        }
    }
}

impl StructureLimiter for SchemaStructureLimiter {
    fn validate(&self, raw_data_contract: &Value) -> ValidationResult {
        let depth = self.check_depth(raw_data_contract);
        if !depth.is_valid() {
            debug!(error_count = depth.errors().len(), "contract failed depth check");
            return depth;
        }
        let patterns = self.check_patterns(raw_data_contract);
        if !patterns.is_valid() {
            debug!(error_count = patterns.errors().len(), "contract has incompatible patterns");
        }
        patterns
    }
}

struct DepthWalker<'a> {
    root: &'a Value,
    max_depth: usize,
    /// `$ref`s currently being expanded, innermost last.
    resolving: Vec<String>,
    /// Expanded height of each `$ref` target already measured.
    heights: HashMap<String, usize>,
}

impl<'a> DepthWalker<'a> {
    /// Height of `value` (scalars 0, containers 1 + tallest child) when it
    /// sits at `level`. Fails as soon as `level + height` would exceed the
    /// maximum.
    fn height(&mut self, value: &'a Value, level: usize) -> Result<usize, ConsensusError> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    return self.ref_height(reference, level);
                }
                self.enter(level)?;
                let mut tallest = 0;
                for child in map.values() {
                    tallest = tallest.max(self.height(child, level + 1)?);
                }
                Ok(tallest + 1)
            }
            Value::Array(items) => {
                self.enter(level)?;
                let mut tallest = 0;
                for child in items {
                    tallest = tallest.max(self.height(child, level + 1)?);
                }
                Ok(tallest + 1)
            }
            _ => Ok(0),
        }
    }

    fn enter(&self, level: usize) -> Result<(), ConsensusError> {
        if level + 1 > self.max_depth {
            return Err(ConsensusError::DataContractMaxDepthExceed { max_depth: self.max_depth });
        }
        Ok(())
    }

    fn ref_height(&mut self, reference: &str, level: usize) -> Result<usize, ConsensusError> {
        let pointer = reference.strip_prefix('#').ok_or_else(|| ConsensusError::InvalidJsonSchemaRef {
            reference: reference.to_string(),
            message: "only local references are allowed".into(),
        })?;

        if self.resolving.iter().any(|r| r == reference) {
            return Err(ConsensusError::InvalidJsonSchemaRef {
                reference: reference.to_string(),
                message: "circular reference".into(),
            });
        }

        if let Some(&height) = self.heights.get(reference) {
            if level + height > self.max_depth {
                return Err(ConsensusError::DataContractMaxDepthExceed { max_depth: self.max_depth });
            }
            return Ok(height);
        }

        let target = self.root.pointer(pointer).ok_or_else(|| ConsensusError::InvalidJsonSchemaRef {
            reference: reference.to_string(),
            message: "reference does not resolve".into(),
        })?;

        self.resolving.push(reference.to_string());
        let height = self.height(target, level);
        self.resolving.pop();
        let height = height?;
        self.heights.insert(reference.to_string(), height);
        Ok(height)
    }
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
