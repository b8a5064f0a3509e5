//! # Data Contract Factory
//!
//! Builds new contracts for an owner (fresh entropy, derived identifier) and
//! turns raw objects into validated contracts.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use dcv_core::{Entropy, Identifier};
use dcv_crypto::{derive_contract_id, generate_entropy};

use crate::contract::DataContract;
use crate::error::ContractError;
use crate::validator::DataContractValidator;

#[derive(Debug)]
pub struct DataContractFactory {
    validator: DataContractValidator,
}

impl DataContractFactory {
    pub fn new(validator: DataContractValidator) -> Self {
        Self { validator }
    }

    /// The validator used by [`create_from_object`](Self::create_from_object).
    pub fn validator(&self) -> &DataContractValidator {
        &self.validator
    }

    /// New contract for `owner_id` with freshly generated entropy.
    ///
    /// The returned contract carries its entropy so a create transition can
    /// be built from it.
    pub fn create(&self, owner_id: Identifier, documents: BTreeMap<String, Value>) -> DataContract {
        self.create_with_entropy(owner_id, generate_entropy(), documents)
    }

    /// New contract for `owner_id` derived from caller-supplied entropy.
    pub fn create_with_entropy(
        &self,
        owner_id: Identifier,
        entropy: Entropy,
        documents: BTreeMap<String, Value>,
    ) -> DataContract {
        let id = derive_contract_id(&owner_id, &entropy);
        let mut contract = DataContract::new(
            self.validator.latest_protocol_version(),
            id,
            owner_id,
            documents,
        );
        contract.set_entropy(entropy);
        debug!(contract_id = %id, owner_id = %owner_id, "data contract created");
        contract
    }

    /// Parse `raw`, validating it first unless `skip_validation` is set.
    ///
    /// # Errors
    ///
    /// - `ContractError::InvalidDataContract` with the consensus errors if
    ///   validation fails.
    /// - `ContractError::Deserialization` if `raw` is not contract-shaped.
    pub fn create_from_object(
        &self,
        raw: &Value,
        skip_validation: bool,
    ) -> Result<DataContract, ContractError> {
        if !skip_validation {
            let result = self.validator.validate(raw)?;
            if !result.is_valid() {
                return Err(ContractError::InvalidDataContract(result));
            }
        }
        DataContract::from_raw_object(raw)
    }
}
