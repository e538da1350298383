//! # Mock Prover
//!
//! A deterministic, transparent stand-in for tests. The response is a
//! SHA-256 digest of the security parameter and the secret; the auxiliary
//! value is the secret itself.
//!
//! ## Security Notice
//!
//! Provides NO zero-knowledge property: the secret travels in the clear.
//! Enabled by the `mock` feature only.

use sha2::{Digest, Sha256};

use crate::traits::{check_security_bits, ProofError, ProofOfKnowledge, ProofTranscript};

/// Transparent prover. Same input, same transcript.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockProver;

fn mock_response(secret: &[u8], bits: u32) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(bits.to_be_bytes());
    hasher.update(secret);
    hasher.finalize().to_vec()
}

impl ProofOfKnowledge for MockProver {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn prove(&self, secret: &[u8], bits: u32) -> Result<ProofTranscript, ProofError> {
        check_security_bits(bits)?;
        Ok(ProofTranscript {
            response: mock_response(secret, bits),
            auxiliary: secret.to_vec(),
        })
    }

    fn verify(&self, transcript: &ProofTranscript, bits: u32) -> Result<bool, ProofError> {
        check_security_bits(bits)?;
        Ok(transcript.response == mock_response(&transcript.auxiliary, bits))
    }
}
