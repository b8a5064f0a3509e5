//! # Validation Results
//!
//! `ValidationResult` is the accumulation primitive: an ordered list of
//! [`ConsensusError`]s, empty exactly when the input is valid. Validators
//! that check many independent rules build one result and `merge` partial
//! results into it. Staged pipelines instead return early on the first
//! non-empty result.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::consensus::ConsensusError;

/// Ordered collection of consensus errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ConsensusError>,
}

impl ValidationResult {
    /// An empty (valid) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// A result holding the given errors in order.
    pub fn from_errors(errors: Vec<ConsensusError>) -> Self {
        Self { errors }
    }

    /// Append one error.
    pub fn add_error(&mut self, error: ConsensusError) {
        self.errors.push(error);
    }

    /// Append several errors, keeping their order.
    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = ConsensusError>) {
        self.errors.extend(errors);
    }

    /// Append every error of `other` after the errors already present.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// True when no errors were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded errors in order.
    pub fn errors(&self) -> &[ConsensusError] {
        &self.errors
    }

    /// The first recorded error, if any.
    pub fn first_error(&self) -> Option<&ConsensusError> {
        self.errors.first()
    }

    /// Consume the result and return its errors.
    pub fn into_errors(self) -> Vec<ConsensusError> {
        self.errors
    }
}

impl From<ConsensusError> for ValidationResult {
    fn from(error: ConsensusError) -> Self {
        Self { errors: vec![error] }
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let reports: Vec<_> = self.errors.iter().map(ConsensusError::report).collect();
        let mut state = serializer.serialize_struct("ValidationResult", 2)?;
        state.serialize_field("isValid", &self.is_valid())?;
        state.serialize_field("errors", &reports)?;
        state.end()
    }
}
