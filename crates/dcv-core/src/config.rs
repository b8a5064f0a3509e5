//! # Validation Configuration
//!
//! Node-level settings for the validation pipeline, loadable from YAML or
//! JSON. Every field has a default, so an empty document is a valid config.
//!
//! Rules whose values are part of the consensus surface are `const`s below
//! rather than config fields: a node must not be able to disagree with its
//! peers on them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum number of `unique: true` indices per document type.
pub const UNIQUE_INDEX_LIMIT: usize = 3;

/// Upper bound for `maxLength` of an indexed string property.
pub const MAX_INDEXED_STRING_PROPERTY_LENGTH: u64 = 1024;

/// Shortest acceptable create-transition entropy, in bytes.
pub const MIN_ENTROPY_LENGTH: usize = 16;

/// Longest acceptable create-transition entropy, in bytes.
pub const MAX_ENTROPY_LENGTH: usize = 20;

/// Settings for contract and transition validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Highest contract protocol version accepted.
    pub latest_protocol_version: u32,
    /// Lowest contract protocol version accepted.
    pub minimum_protocol_version: u32,
    /// Maximum nesting depth of a contract after local `$ref` expansion.
    pub max_schema_depth: usize,
    /// Compiled-size limit, in bytes, for `pattern` regexes.
    pub pattern_size_limit: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            latest_protocol_version: 1,
            minimum_protocol_version: 1,
            max_schema_depth: 500,
            pattern_size_limit: 50_000,
        }
    }
}

impl ValidationConfig {
    /// Parse and check a YAML (or JSON) document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and check a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimum_protocol_version > self.latest_protocol_version {
            return Err(ConfigError::Invalid(format!(
                "minimumProtocolVersion {} exceeds latestProtocolVersion {}",
                self.minimum_protocol_version, self.latest_protocol_version
            )));
        }
        if self.max_schema_depth == 0 {
            return Err(ConfigError::Invalid("maxSchemaDepth must be positive".into()));
        }
        if self.pattern_size_limit == 0 {
            return Err(ConfigError::Invalid("patternSizeLimit must be positive".into()));
        }
        Ok(())
    }
}
