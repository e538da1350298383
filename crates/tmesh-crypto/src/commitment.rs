//! # Location Commitments
//!
//! Binds an identity's secret and a quantized location to one group element.
//!
//! ## Constructions
//!
//! ```text
//! SelfBlinded:       C = x·G + H(cell)·G        (x = identity private scalar)
//! RandomBlinded(r):  C = H(cell)·G + r·H        (r independent, H = hash-to-point)
//! ```
//!
//! `H(cell)` is [`hash_to_scalar()`] over the fixed-width cell bytes. Both
//! constructions are deterministic in their inputs: recommitting with the
//! same inputs yields a bit-identical point.
//!
//! ## Known Weakness of `SelfBlinded`
//!
//! `SelfBlinded` is binding (under discrete log) but **not hiding**. Because
//! `x·G` is the public key, anyone holding the public key can test a
//! candidate cell offline with [`LocationCommitment::matches_public_key()`].
//! Grid cells are a small, enumerable space. This is the construction the
//! network has always issued, so it stays the default; `RandomBlinded` is
//! the strictly hiding alternative and opens only with the holder's
//! [`BlindingFactor`]. Hiding here covers the commitment alone; anything
//! published next to it (such as a proof over the cell) must be salted with
//! the same factor or it reveals the cell on its own.

use std::sync::OnceLock;

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::{RistrettoPoint, Scalar};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha512;
use tmesh_core::{CommitmentMode, IdentityError};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::b64;
use crate::digest::hash_to_scalar;
use crate::entropy::random_scalar;
use crate::keys::{PrivateScalar, PublicKey};

/// Length of an encoded commitment.
pub const COMMITMENT_SIZE: usize = 32;

/// Domain label for the second Pedersen generator.
const PEDERSEN_H_LABEL: &[u8] = b"trustmesh/location-commitment/pedersen-h/v1";

/// Second generator `H` with unknown discrete log relative to `G`.
fn pedersen_h() -> &'static RistrettoPoint {
    static H: OnceLock<RistrettoPoint> = OnceLock::new();
    H.get_or_init(|| RistrettoPoint::hash_from_bytes::<Sha512>(PEDERSEN_H_LABEL))
}

/// Independent blinding factor for the hiding construction.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BlindingFactor(Scalar);

impl BlindingFactor {
    /// Draw a uniformly random blinding factor.
    pub fn random() -> Result<Self, IdentityError> {
        Ok(Self(random_scalar()?))
    }

    /// Restore a blinding factor from its canonical 32-byte encoding.
    ///
    /// Returns `None` if the bytes are not a canonical scalar.
    pub fn from_bytes(bytes: [u8; 32]) -> Option<Self> {
        Option::from(Scalar::from_canonical_bytes(bytes)).map(Self)
    }

    /// Canonical 32-byte encoding. As sensitive as a private key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl std::fmt::Debug for BlindingFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BlindingFactor(<private>)")
    }
}

/// Which commitment construction an identity uses.
#[derive(Debug)]
pub enum CommitmentScheme {
    /// Blinded by the identity's own private scalar.
    SelfBlinded,
    /// Blinded by an independent random factor.
    RandomBlinded(BlindingFactor),
}

impl CommitmentScheme {
    /// Instantiate the configured construction, drawing a fresh blinding
    /// factor for `RandomBlinded`.
    pub fn for_mode(mode: CommitmentMode) -> Result<Self, IdentityError> {
        match mode {
            CommitmentMode::SelfBlinded => Ok(Self::SelfBlinded),
            CommitmentMode::RandomBlinded => Ok(Self::RandomBlinded(BlindingFactor::random()?)),
        }
    }

    /// The configuration tag for this construction.
    pub fn mode(&self) -> CommitmentMode {
        match self {
            Self::SelfBlinded => CommitmentMode::SelfBlinded,
            Self::RandomBlinded(_) => CommitmentMode::RandomBlinded,
        }
    }

    /// Commit to `cell_bytes`.
    pub fn commit(&self, private: &PrivateScalar, cell_bytes: &[u8]) -> LocationCommitment {
        match self {
            Self::SelfBlinded => commit(private, cell_bytes),
            Self::RandomBlinded(blinding) => random_blinded(cell_bytes, blinding),
        }
    }

    /// Recompute and compare. Only the holder of the secrets can do this.
    pub fn verify(
        &self,
        commitment: &LocationCommitment,
        private: &PrivateScalar,
        cell_bytes: &[u8],
    ) -> bool {
        &self.commit(private, cell_bytes) == commitment
    }
}

/// Self-blinded commitment: `C = x·G + H(cell)·G`.
pub fn commit(private: &PrivateScalar, cell_bytes: &[u8]) -> LocationCommitment {
    let h = hash_to_scalar(cell_bytes);
    let secret_part = RISTRETTO_BASEPOINT_POINT * private.as_scalar();
    let location_part = RISTRETTO_BASEPOINT_POINT * h;
    LocationCommitment {
        point: secret_part + location_part,
    }
}

fn random_blinded(cell_bytes: &[u8], blinding: &BlindingFactor) -> LocationCommitment {
    let h = hash_to_scalar(cell_bytes);
    LocationCommitment {
        point: RISTRETTO_BASEPOINT_POINT * h + pedersen_h() * blinding.0,
    }
}

/// A commitment point.
///
/// Serializes as standard base64 of the 32-byte compressed encoding. The
/// encoding is not self-describing; verifiers must know the group.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LocationCommitment {
    point: RistrettoPoint,
}

impl LocationCommitment {
    /// Canonical 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; COMMITMENT_SIZE] {
        self.point.compress().to_bytes()
    }

    /// Parse a canonical encoding.
    ///
    /// # Errors
    ///
    /// [`IdentityError::Decoding`] if the bytes are not a canonical group
    /// element encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        let point = CompressedRistretto::from_slice(bytes)
            .ok()
            .and_then(|c| c.decompress())
            .ok_or_else(|| {
                IdentityError::Decoding(
                    "location commitment is not a canonical Ristretto255 encoding".to_string(),
                )
            })?;
        Ok(Self { point })
    }

    /// Standard base64 of the canonical encoding.
    pub fn to_base64(&self) -> String {
        b64::encode(&self.to_bytes())
    }

    /// Parse the base64 form.
    pub fn from_base64(text: &str) -> Result<Self, IdentityError> {
        let bytes = b64::decode(text.trim())
            .map_err(|e| IdentityError::Decoding(format!("commitment base64: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Test a self-blinded commitment against a public key and candidate
    /// cell: `C == P + H(cell)·G`.
    ///
    /// Needs no secret. This is exactly the offline test that makes the
    /// self-blinded construction non-hiding.
    pub fn matches_public_key(&self, public: &PublicKey, cell_bytes: &[u8]) -> bool {
        let expected = public.as_point() + RISTRETTO_BASEPOINT_POINT * hash_to_scalar(cell_bytes);
        self.point == expected
    }

    /// Open a random-blinded commitment: `C == H(cell)·G + r·H`.
    pub fn opens_to(&self, cell_bytes: &[u8], blinding: &BlindingFactor) -> bool {
        random_blinded(cell_bytes, blinding) == *self
    }
}

impl std::hash::Hash for LocationCommitment {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl Serialize for LocationCommitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for LocationCommitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base64(&text).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for LocationCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.to_bytes().iter().take(4).map(|b| format!("{b:02x}")).collect();
        write!(f, "LocationCommitment({prefix}...)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPair;
    use tmesh_core::quantize;

    fn sf_cell() -> [u8; 16] {
        quantize(37.7749, -122.4194, 100.0).unwrap().to_bytes()
    }

    #[test]
    fn commitment_is_deterministic() {
        let kp = KeyPair::from_seed(&[3u8; 32]);
        let a = commit(kp.private_scalar(), &sf_cell());
        let b = commit(kp.private_scalar(), &sf_cell());
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn same_location_different_keys_differ() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        assert_ne!(
            commit(a.private_scalar(), &sf_cell()),
            commit(b.private_scalar(), &sf_cell())
        );
    }

    #[test]
    fn same_key_different_locations_differ() {
        let kp = KeyPair::generate().unwrap();
        let nyc = quantize(40.7128, -74.0060, 100.0).unwrap().to_bytes();
        assert_ne!(
            commit(kp.private_scalar(), &sf_cell()),
            commit(kp.private_scalar(), &nyc)
        );
    }

    #[test]
    fn self_blinded_is_testable_with_public_key() {
        let kp = KeyPair::generate().unwrap();
        let c = commit(kp.private_scalar(), &sf_cell());
        assert!(c.matches_public_key(&kp.public_key(), &sf_cell()));
        let elsewhere = quantize(51.5074, -0.1278, 100.0).unwrap().to_bytes();
        assert!(!c.matches_public_key(&kp.public_key(), &elsewhere));
    }

    #[test]
    fn random_blinded_hides_from_public_key_test() {
        let kp = KeyPair::generate().unwrap();
        let scheme = CommitmentScheme::for_mode(CommitmentMode::RandomBlinded).unwrap();
        let c = scheme.commit(kp.private_scalar(), &sf_cell());
        assert!(!c.matches_public_key(&kp.public_key(), &sf_cell()));
        match &scheme {
            CommitmentScheme::RandomBlinded(r) => assert!(c.opens_to(&sf_cell(), r)),
            CommitmentScheme::SelfBlinded => panic!("expected random-blinded scheme"),
        }
    }

    #[test]
    fn random_blinded_commitments_differ_per_factor() {
        let kp = KeyPair::generate().unwrap();
        let s1 = CommitmentScheme::for_mode(CommitmentMode::RandomBlinded).unwrap();
        let s2 = CommitmentScheme::for_mode(CommitmentMode::RandomBlinded).unwrap();
        assert_ne!(
            s1.commit(kp.private_scalar(), &sf_cell()),
            s2.commit(kp.private_scalar(), &sf_cell())
        );
    }

    #[test]
    fn scheme_verify_recomputes() {
        let kp = KeyPair::generate().unwrap();
        for mode in [CommitmentMode::SelfBlinded, CommitmentMode::RandomBlinded] {
            let scheme = CommitmentScheme::for_mode(mode).unwrap();
            assert_eq!(scheme.mode(), mode);
            let c = scheme.commit(kp.private_scalar(), &sf_cell());
            assert!(scheme.verify(&c, kp.private_scalar(), &sf_cell()));
            assert!(!scheme.verify(&c, kp.private_scalar(), &[0u8; 16]));
        }
    }

    #[test]
    fn blinding_factor_bytes_roundtrip() {
        let r = BlindingFactor::random().unwrap();
        let restored = BlindingFactor::from_bytes(r.to_bytes()).unwrap();
        assert_eq!(r.to_bytes(), restored.to_bytes());
        assert!(BlindingFactor::from_bytes([0xff; 32]).is_none());
    }

    #[test]
    fn commitment_base64_roundtrip_and_rejects_garbage() {
        let kp = KeyPair::generate().unwrap();
        let c = commit(kp.private_scalar(), &sf_cell());
        assert_eq!(LocationCommitment::from_base64(&c.to_base64()).unwrap(), c);
        assert!(LocationCommitment::from_bytes(&[0xff; 32]).is_err());
        assert!(LocationCommitment::from_base64("not base64!").is_err());
    }

    #[test]
    fn serde_uses_base64_string() {
        let kp = KeyPair::from_seed(&[5u8; 32]);
        let c = commit(kp.private_scalar(), &sf_cell());
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, format!("\"{}\"", c.to_base64()));
        assert_eq!(serde_json::from_str::<LocationCommitment>(&json).unwrap(), c);
    }

    #[test]
    fn blinding_factor_debug_is_redacted() {
        let r = BlindingFactor::random().unwrap();
        assert_eq!(format!("{r:?}"), "BlindingFactor(<private>)");
    }
}
