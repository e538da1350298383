//! # Schnorr Proof of Knowledge
//!
//! Non-interactive (Fiat–Shamir) proof of knowledge of `x = H(secret)` for
//! the public value `X = x·G` over Ristretto255.
//!
//! ```text
//! prove:   k ←$ Zℓ*,  R = k·G
//!          c = trunc_bits(SHA-512(label ‖ bits ‖ X ‖ R)) mod ℓ
//!          s = k + c·x
//!          response  = c ‖ s      (32-byte big-endian each)
//!          auxiliary = X          (compressed, 32 bytes)
//!
//! verify:  R' = s·G − c·X
//!          accept iff c == trunc_bits(SHA-512(label ‖ bits ‖ X ‖ R'))
//! ```
//!
//! The security parameter is the challenge length. It is bound into the
//! challenge hash, so a transcript verifies only at the parameter it was
//! produced with.
//!
//! ## What This Does Not Hide
//!
//! `X` is a deterministic function of the secret. When the secret is a
//! grid cell, anyone can enumerate candidate cells and compare `X`. The
//! proof shows the prover knows a preimage; it does not conceal which one
//! from a party willing to search. Callers that need the secret hidden must
//! salt it with high-entropy material, as
//! [`prove_blinded_location()`](crate::proof::prove_blinded_location) does.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::{RistrettoPoint, Scalar};
use sha2::{Digest, Sha512};
use tmesh_crypto::entropy::random_nonzero_scalar;
use tmesh_crypto::hash_to_scalar;
use zeroize::Zeroize;

use crate::traits::{check_security_bits, ProofError, ProofOfKnowledge, ProofTranscript};

const CHALLENGE_LABEL: &[u8] = b"tmesh-schnorr-pok";

const SCALAR_LEN: usize = 32;

/// Length of a Schnorr response (`c ‖ s`).
pub const RESPONSE_LEN: usize = 2 * SCALAR_LEN;

/// Length of a Schnorr auxiliary value (compressed `X`).
pub const AUXILIARY_LEN: usize = 32;

/// Fiat–Shamir Schnorr prover and verifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchnorrProver;

impl SchnorrProver {
    /// Construct a prover. It carries no state.
    pub fn new() -> Self {
        Self
    }
}

fn challenge(bits: u32, public: &CompressedRistretto, nonce_point: &CompressedRistretto) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(CHALLENGE_LABEL);
    hasher.update(bits.to_be_bytes());
    hasher.update(public.as_bytes());
    hasher.update(nonce_point.as_bytes());
    let digest = hasher.finalize();

    let take = (bits / 8) as usize;
    let mut wide = [0u8; SCALAR_LEN];
    wide[..take].copy_from_slice(&digest[..take]);
    Scalar::from_bytes_mod_order(wide)
}

fn scalar_to_be(s: &Scalar) -> [u8; SCALAR_LEN] {
    let mut bytes = s.to_bytes();
    bytes.reverse();
    bytes
}

fn scalar_from_be(bytes: &[u8]) -> Option<Scalar> {
    let mut le: [u8; SCALAR_LEN] = bytes.try_into().ok()?;
    le.reverse();
    Option::from(Scalar::from_canonical_bytes(le))
}

impl ProofOfKnowledge for SchnorrProver {
    fn name(&self) -> &'static str {
        "schnorr-ristretto255"
    }

    fn prove(&self, secret: &[u8], bits: u32) -> Result<ProofTranscript, ProofError> {
        check_security_bits(bits)?;

        let mut x = hash_to_scalar(secret);
        let public = (RISTRETTO_BASEPOINT_POINT * x).compress();

        let mut k = random_nonzero_scalar().map_err(|e| ProofError::Entropy(e.to_string()))?;
        let nonce_point = (RISTRETTO_BASEPOINT_POINT * k).compress();

        let c = challenge(bits, &public, &nonce_point);
        let s = k + c * x;
        x.zeroize();
        k.zeroize();

        let mut response = Vec::with_capacity(RESPONSE_LEN);
        response.extend_from_slice(&scalar_to_be(&c));
        response.extend_from_slice(&scalar_to_be(&s));

        Ok(ProofTranscript {
            response,
            auxiliary: public.to_bytes().to_vec(),
        })
    }

    fn verify(&self, transcript: &ProofTranscript, bits: u32) -> Result<bool, ProofError> {
        check_security_bits(bits)?;

        if transcript.response.len() != RESPONSE_LEN {
            return Err(ProofError::MalformedTranscript(format!(
                "response is {} bytes, expected {RESPONSE_LEN}",
                transcript.response.len()
            )));
        }
        let public_compressed = CompressedRistretto::from_slice(&transcript.auxiliary)
            .map_err(|_| {
                ProofError::MalformedTranscript(format!(
                    "auxiliary is {} bytes, expected {AUXILIARY_LEN}",
                    transcript.auxiliary.len()
                ))
            })?;
        let public = public_compressed.decompress().ok_or_else(|| {
            ProofError::MalformedTranscript("auxiliary is not a group element".to_string())
        })?;

        let (c_bytes, s_bytes) = transcript.response.split_at(SCALAR_LEN);
        let (Some(c), Some(s)) = (scalar_from_be(c_bytes), scalar_from_be(s_bytes)) else {
            return Ok(false);
        };

        let nonce_point = RistrettoPoint::vartime_double_scalar_mul_basepoint(&(-c), &public, &s);
        Ok(challenge(bits, &public_compressed, &nonce_point.compress()) == c)
    }
}
