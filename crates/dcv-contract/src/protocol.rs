//! # Protocol Version Check
//!
//! A node accepts contracts written for protocol versions in
//! `minimum..=latest`. Newer versions may use rules this node does not know;
//! older ones may rely on rules that were since removed.

use dcv_core::{ConsensusError, ValidationConfig, ValidationResult};

/// Bounds check on a contract's `protocolVersion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersionValidator {
    latest_version: u32,
    minimum_version: u32,
}

impl ProtocolVersionValidator {
    pub fn new(latest_version: u32, minimum_version: u32) -> Self {
        Self { latest_version, minimum_version }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(config.latest_protocol_version, config.minimum_protocol_version)
    }

    /// Highest version this validator accepts.
    pub fn latest_version(&self) -> u32 {
        self.latest_version
    }

    pub fn validate(&self, protocol_version: u32) -> ValidationResult {
        if protocol_version > self.latest_version {
            return ConsensusError::UnsupportedProtocolVersion {
                parsed_protocol_version: protocol_version,
                latest_version: self.latest_version,
            }
            .into();
        }
        if protocol_version < self.minimum_version {
            return ConsensusError::IncompatibleProtocolVersion {
                parsed_protocol_version: protocol_version,
                minimal_protocol_version: self.minimum_version,
            }
            .into();
        }
        ValidationResult::new()
    }
}
