//! # Ed25519 Signing and Verification
//!
//! Key pairs, public keys and signatures for identity keys of type
//! `ED25519`.
//!
//! ## Security Invariant
//!
//! - Signing input is `&CanonicalBytes`. A transition is signed over its
//!   canonical signable form, never over ad hoc bytes.
//! - `Ed25519KeyPair` does not implement `Serialize` and its `Debug` output
//!   hides the private key.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as lowercase hex strings.

use dcv_core::{CanonicalBytes, CryptoError};
use ed25519_dalek::Signer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An Ed25519 public key (32 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

/// An Ed25519 key pair.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Copy key bytes from a slice, as stored in identity key `data`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::KeyError(format!("public key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s.trim()).map_err(|e| CryptoError::KeyError(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex::encode(&self.0[..4]))
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Copy signature bytes from a slice, as carried by a transition.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::VerificationFailed(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim()).map_err(serde::de::Error::custom)?;
        Self::from_slice(&bytes).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex::encode(&self.0[..4]))
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self { signing_key: ed25519_dalek::SigningKey::generate(&mut csprng) }
    }

    /// Deterministic key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { signing_key: ed25519_dalek::SigningKey::from_bytes(seed) }
    }

    /// The public half.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify `signature` over `data` with `public_key`.
///
/// Uses strict verification, which rejects small-order keys and
/// non-canonical signature encodings.
pub fn verify_with_public_key(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify_strict(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical(value: serde_json::Value) -> CanonicalBytes {
        CanonicalBytes::new(&value).unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let data = canonical(json!({"protocolVersion": 1, "entropy": "00ff"}));
        let sig = kp.sign(&data);
        verify_with_public_key(&data, &sig, &kp.public_key()).unwrap();
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let signer = Ed25519KeyPair::from_seed(&[1; 32]);
        let other = Ed25519KeyPair::from_seed(&[2; 32]);
        let data = canonical(json!({"a": 1}));
        let sig = signer.sign(&data);
        assert!(matches!(
            verify_with_public_key(&data, &sig, &other.public_key()),
            Err(CryptoError::VerificationFailed(_))
        ));
    }

    #[test]
    fn test_verify_tampered_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&canonical(json!({"entropy": "aa"})));
        assert!(verify_with_public_key(&canonical(json!({"entropy": "ab"})), &sig, &kp.public_key()).is_err());
    }

    #[test]
    fn test_seeded_signatures_are_deterministic() {
        let data = canonical(json!({"x": 1}));
        let a = Ed25519KeyPair::from_seed(&[42; 32]).sign(&data);
        let b = Ed25519KeyPair::from_seed(&[42; 32]).sign(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_from_slice_checks_length() {
        assert!(Ed25519Signature::from_slice(&[0u8; 65]).is_err());
        assert!(Ed25519Signature::from_slice(&[0u8; 64]).is_ok());
    }

    #[test]
    fn test_public_key_from_slice_checks_length() {
        assert!(matches!(Ed25519PublicKey::from_slice(&[0u8; 33]), Err(CryptoError::KeyError(_))));
    }

    #[test]
    fn test_public_key_serde_hex() {
        let pk = Ed25519KeyPair::from_seed(&[3; 32]).public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json.len(), 64 + 2);
        let back: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn test_signature_serde_hex() {
        let sig = Ed25519KeyPair::from_seed(&[3; 32]).sign(&canonical(json!({})));
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json.len(), 128 + 2);
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
        assert_eq!(back.to_hex(), hex::encode(sig.as_bytes()));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let kp = Ed25519KeyPair::from_seed(&[9; 32]);
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
    }
}
