//! # Contract Identifier Derivation
//!
//! A contract id is `double_sha256(ownerId || entropy)`: the 32 owner id
//! bytes followed by the raw entropy bytes, with no separator or length
//! prefix. The owner id has fixed width, so the concatenation is
//! unambiguous.
//!
//! This layout is the consensus surface for contract ids. The transition
//! validator re-derives the id from the signed entropy and rejects any
//! contract whose declared `$id` differs.

use dcv_core::{double_sha256, Entropy, Identifier};
use rand::RngCore;

/// Length of freshly generated entropy, in bytes.
pub const ENTROPY_LENGTH: usize = 20;

/// Derive the identifier of a contract owned by `owner_id`.
pub fn derive_contract_id(owner_id: &Identifier, entropy: &Entropy) -> Identifier {
    let mut preimage = Vec::with_capacity(Identifier::LENGTH + entropy.len());
    preimage.extend_from_slice(owner_id.as_bytes());
    preimage.extend_from_slice(entropy.as_bytes());
    Identifier::from_bytes(double_sha256(&preimage))
}

/// Draw [`ENTROPY_LENGTH`] random bytes from the OS RNG.
pub fn generate_entropy() -> Entropy {
    let mut bytes = vec![0u8; ENTROPY_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Entropy::from_bytes(bytes)
}
