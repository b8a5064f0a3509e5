//! # Data Contract Create Transition
//!
//! The signed request to create a contract:
//!
//! ```json
//! {
//!   "protocolVersion": 1,
//!   "dataContract": { ...raw contract... },
//!   "entropy": "<hex>",
//!   "signaturePublicKeyId": 0,
//!   "signature": "<hex>"
//! }
//! ```
//!
//! ## Signable bytes
//!
//! The owner signs the JCS canonical bytes of the transition with
//! `signature` and `signaturePublicKeyId` removed. Entropy is part of the
//! signed payload, so replacing it invalidates the signature as well as the
//! identifier derivation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dcv_contract::DataContract;
use dcv_core::{CanonicalBytes, Entropy};
use dcv_crypto::Ed25519KeyPair;

use crate::error::TransitionError;

const UNSIGNED_FIELDS: [&str; 2] = ["signature", "signaturePublicKeyId"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataContractCreateTransition {
    protocol_version: u32,
    data_contract: Value,
    entropy: Entropy,
    signature_public_key_id: u32,
    #[serde(with = "hex")]
    signature: Vec<u8>,
}

impl DataContractCreateTransition {
    /// Unsigned transition for a contract that still carries its entropy.
    ///
    /// # Errors
    ///
    /// `TransitionError::MissingEntropy` if the contract's entropy is unknown.
    pub fn from_contract(contract: &DataContract) -> Result<Self, TransitionError> {
        let entropy = contract.entropy().cloned().ok_or_else(|| TransitionError::MissingEntropy {
            contract_id: contract.id().to_hex(),
        })?;
        Ok(Self::new(contract.protocol_version(), contract.to_raw_object()?, entropy))
    }

    /// Unsigned transition from parts.
    pub fn new(protocol_version: u32, data_contract: Value, entropy: Entropy) -> Self {
        Self {
            protocol_version,
            data_contract,
            entropy,
            signature_public_key_id: 0,
            signature: Vec::new(),
        }
    }

    pub fn from_raw_object(raw: &Value) -> Result<Self, TransitionError> {
        Ok(Self::deserialize(raw)?)
    }

    pub fn to_raw_object(&self) -> Result<Value, TransitionError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// The embedded raw contract.
    pub fn data_contract(&self) -> &Value {
        &self.data_contract
    }

    pub fn entropy(&self) -> &Entropy {
        &self.entropy
    }

    pub fn signature_public_key_id(&self) -> u32 {
        self.signature_public_key_id
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Attach a signature produced elsewhere.
    pub fn set_signature(&mut self, key_id: u32, signature: Vec<u8>) {
        self.signature_public_key_id = key_id;
        self.signature = signature;
    }

    /// Canonical bytes covered by the signature.
    pub fn signable_bytes(&self) -> Result<CanonicalBytes, TransitionError> {
        let mut payload = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut payload {
            for field in UNSIGNED_FIELDS {
                map.remove(field);
            }
        }
        Ok(CanonicalBytes::new(&payload)?)
    }

    /// Sign with an Ed25519 identity key registered under `key_id`.
    pub fn sign(&mut self, key_pair: &Ed25519KeyPair, key_id: u32) -> Result<(), TransitionError> {
        let signature = key_pair.sign(&self.signable_bytes()?);
        self.set_signature(key_id, signature.as_bytes().to_vec());
        Ok(())
    }
}
