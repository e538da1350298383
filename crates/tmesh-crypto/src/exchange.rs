//! # Diffie–Hellman Shared Secrets
//!
//! `secret = encode(peer_public · private)`. Both sides of a pair compute
//! the same 32 bytes. The result is key material, not a key: use
//! [`SharedSecret::derive_key()`] to obtain an AEAD key.

use curve25519_dalek::traits::IsIdentity;
use subtle::ConstantTimeEq;
use tmesh_core::IdentityError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::aead::SymmetricKey;
use crate::keys::{PrivateScalar, PublicKey};

/// Length of a [`SharedSecret`].
pub const SHARED_SECRET_SIZE: usize = 32;

/// The compressed Diffie–Hellman point. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    /// Raw secret bytes. Do not log or persist.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }

    /// Derive a 32-byte AEAD key bound to `context` (BLAKE3 key derivation).
    pub fn derive_key(&self, context: &str) -> SymmetricKey {
        SymmetricKey::from_array(blake3::derive_key(context, &self.0))
    }
}

impl ConstantTimeEq for SharedSecret {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SharedSecret {}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// Diffie–Hellman against an encoded peer point.
///
/// # Errors
///
/// [`IdentityError::InvalidPeerKey`] if `peer_public` is not a canonical,
/// non-identity Ristretto255 encoding.
pub fn derive_shared_secret(
    private: &PrivateScalar,
    peer_public: &[u8],
) -> Result<SharedSecret, IdentityError> {
    let peer = PublicKey::from_bytes(peer_public)?;
    diffie_hellman(private, &peer)
}

pub(crate) fn diffie_hellman(
    private: &PrivateScalar,
    peer: &PublicKey,
) -> Result<SharedSecret, IdentityError> {
    let shared = peer.as_point() * private.as_scalar();
    // Ristretto255 has no small subgroup, so this only trips on a zero scalar.
    if shared.is_identity() {
        return Err(IdentityError::InvalidPeerKey(
            "shared point is the identity".to_string(),
        ));
    }
    Ok(SharedSecret(shared.compress().to_bytes()))
}
