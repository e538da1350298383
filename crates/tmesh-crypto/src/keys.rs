//! # Ristretto255 Key Pairs
//!
//! An identity key pair is `(x, P)` with `P = x · G` over Ristretto255.
//!
//! ## Security Invariant
//!
//! - `PrivateScalar` does not implement `Serialize`, `Clone`, or a revealing
//!   `Debug`. It is zeroized on drop and owned by exactly one [`KeyPair`].
//! - `PublicKey` can only be constructed from a canonical, non-identity
//!   point encoding, so every `PublicKey` in the system is a usable
//!   Diffie–Hellman peer.
//!
//! ## Serde
//!
//! Public keys serialize as standard base64 of the 32-byte compressed
//! Ristretto encoding. The encoding is not self-describing: a decoder must
//! already know the group.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::traits::IsIdentity;
use curve25519_dalek::{RistrettoPoint, Scalar};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tmesh_core::IdentityError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::b64;
use crate::digest::hash_to_scalar;
use crate::entropy::random_nonzero_scalar;
use crate::exchange::{diffie_hellman, SharedSecret};

/// Length of an encoded public key.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// A private scalar. Never serialized, never logged.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateScalar(Scalar);

impl PrivateScalar {
    pub(crate) fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

impl std::fmt::Debug for PrivateScalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateScalar(<private>)")
    }
}

/// A validated Ristretto255 public point.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    point: RistrettoPoint,
    encoded: [u8; PUBLIC_KEY_SIZE],
}

impl PublicKey {
    fn from_point(point: RistrettoPoint) -> Self {
        Self {
            point,
            encoded: point.compress().to_bytes(),
        }
    }

    /// Parse a compressed Ristretto encoding.
    ///
    /// # Errors
    ///
    /// [`IdentityError::InvalidPeerKey`] if the input is not 32 bytes, is not
    /// a canonical encoding of a group element, or encodes the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        let compressed = CompressedRistretto::from_slice(bytes).map_err(|_| {
            IdentityError::InvalidPeerKey(format!(
                "expected {PUBLIC_KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        let point = compressed.decompress().ok_or_else(|| {
            IdentityError::InvalidPeerKey("not a canonical Ristretto255 encoding".to_string())
        })?;
        if point.is_identity() {
            return Err(IdentityError::InvalidPeerKey(
                "identity element is not a valid public key".to_string(),
            ));
        }
        Ok(Self {
            point,
            encoded: compressed.to_bytes(),
        })
    }

    /// Canonical 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.encoded
    }

    /// Borrow the canonical encoding.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.encoded
    }

    /// Standard base64 of the canonical encoding.
    ///
    /// This string is the stable identity key used by the nonce registry.
    pub fn to_base64(&self) -> String {
        b64::encode(&self.encoded)
    }

    /// Parse the base64 form produced by [`to_base64()`](Self::to_base64).
    pub fn from_base64(text: &str) -> Result<Self, IdentityError> {
        let bytes = b64::decode(text.trim())
            .map_err(|e| IdentityError::InvalidPeerKey(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// The underlying group element.
    pub fn as_point(&self) -> &RistrettoPoint {
        &self.point
    }
}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base64(&text).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.encoded.iter().take(4).map(|b| format!("{b:02x}")).collect();
        write!(f, "PublicKey({prefix}...)")
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// An identity key pair. Exclusively owned by the identity that created it.
pub struct KeyPair {
    private: PrivateScalar,
    public: PublicKey,
}

impl KeyPair {
    /// Draw a fresh key pair from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// [`IdentityError::EntropyExhausted`] if the entropy source fails.
    /// This is fatal and not worth retrying.
    pub fn generate() -> Result<Self, IdentityError> {
        let scalar = random_nonzero_scalar()?;
        Ok(Self::from_scalar(scalar))
    }

    /// Derive a key pair deterministically from a 32-byte seed.
    ///
    /// The scalar is `hash_to_scalar(seed)`. Intended for recovery and tests;
    /// the seed is as sensitive as the private key.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_scalar(hash_to_scalar(seed))
    }

    fn from_scalar(scalar: Scalar) -> Self {
        let public = PublicKey::from_point(RISTRETTO_BASEPOINT_POINT * scalar);
        Self {
            private: PrivateScalar(scalar),
            public,
        }
    }

    /// The public half.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// The private half, for commitment and key exchange.
    pub fn private_scalar(&self) -> &PrivateScalar {
        &self.private
    }

    /// Diffie–Hellman with a peer: `peer · x`.
    pub fn shared_secret(&self, peer: &PublicKey) -> Result<SharedSecret, IdentityError> {
        diffie_hellman(&self.private, peer)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"<private>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_is_recoverable_from_private() {
        let kp = KeyPair::generate().unwrap();
        let recomputed = RISTRETTO_BASEPOINT_POINT * kp.private_scalar().as_scalar();
        assert_eq!(&recomputed, kp.public_key().as_point());
    }

    #[test]
    fn generated_keys_differ() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn seeded_keys_are_deterministic() {
        let a = KeyPair::from_seed(&[7u8; 32]);
        let b = KeyPair::from_seed(&[7u8; 32]);
        let c = KeyPair::from_seed(&[8u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(a.public_key(), c.public_key());
    }

    #[test]
    fn public_key_bytes_roundtrip() {
        let pk = KeyPair::generate().unwrap().public_key();
        assert_eq!(PublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
        assert_eq!(PublicKey::from_base64(&pk.to_base64()).unwrap(), pk);
    }

    #[test]
    fn identity_point_rejected() {
        let err = PublicKey::from_bytes(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidPeerKey(_)));
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(PublicKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PublicKey::from_bytes(&[1u8; 33]).is_err());
    }

    #[test]
    fn non_canonical_encoding_rejected() {
        // All-0xff is not a canonical field element encoding.
        assert!(PublicKey::from_bytes(&[0xffu8; 32]).is_err());
    }

    #[test]
    fn serde_uses_base64_string() {
        let pk = KeyPair::from_seed(&[1u8; 32]).public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", pk.to_base64()));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let kp = KeyPair::generate().unwrap();
        let debug = format!("{kp:?}");
        assert!(debug.contains("<private>"));
        assert_eq!(
            format!("{:?}", kp.private_scalar()),
            "PrivateScalar(<private>)"
        );
    }
}
