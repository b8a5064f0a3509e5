//! # Identities
//!
//! The part of an identity the create-transition checks read: its
//! identifier and its public keys. Key material is carried as raw bytes
//! (hex on the wire) and only interpreted once the key type is known.

use serde::{Deserialize, Serialize};

use dcv_core::Identifier;

/// Algorithm of an identity public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyType {
    EcdsaSecp256k1,
    Ed25519,
    #[serde(rename = "BLS12_381")]
    Bls12_381,
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EcdsaSecp256k1 => "ECDSA_SECP256K1",
            Self::Ed25519 => "ED25519",
            Self::Bls12_381 => "BLS12_381",
        };
        f.write_str(s)
    }
}

/// One public key registered on an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPublicKey {
    /// Key id, referenced by `signaturePublicKeyId`.
    pub id: u32,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    /// Raw key bytes.
    #[serde(with = "hex")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Identifier,
    pub public_keys: Vec<IdentityPublicKey>,
}

impl Identity {
    pub fn new(id: Identifier, public_keys: Vec<IdentityPublicKey>) -> Self {
        Self { id, public_keys }
    }

    /// The key with `key_id`, if registered.
    pub fn public_key(&self, key_id: u32) -> Option<&IdentityPublicKey> {
        self.public_keys.iter().find(|k| k.id == key_id)
    }
}
