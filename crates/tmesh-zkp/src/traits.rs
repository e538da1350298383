//! # Proof-of-Knowledge Trait
//!
//! The narrow capability the location proof wrapper depends on. A prover
//! takes a secret string and a security parameter and returns an opaque
//! `(response, auxiliary)` transcript. Nothing outside an implementation
//! interprets those bytes.
//!
//! ## Security Invariant
//!
//! Implementations are `Send + Sync` and hold no per-call state, so one
//! prover can serve concurrent issuances for independent identities.

use thiserror::Error;
use tmesh_core::config::{MAX_SECURITY_BITS, MIN_SECURITY_BITS};
use tmesh_core::IdentityError;

/// Error raised by a proof-of-knowledge implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The security parameter is outside what the prover supports.
    #[error("unsupported security parameter: {0} bits")]
    InvalidSecurityParameter(u32),
    /// The prover needed randomness and could not get it.
    #[error("prover entropy failure: {0}")]
    Entropy(String),
    /// A transcript could not be parsed by this prover.
    #[error("malformed transcript: {0}")]
    MalformedTranscript(String),
}

impl From<ProofError> for IdentityError {
    fn from(err: ProofError) -> Self {
        match err {
            ProofError::InvalidSecurityParameter(bits) => Self::InvalidSecurityParameter(bits),
            ProofError::Entropy(msg) => Self::EntropyExhausted(msg),
            other @ ProofError::MalformedTranscript(_) => Self::Proof(other.to_string()),
        }
    }
}

/// Raw prover output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofTranscript {
    /// Prover response.
    pub response: Vec<u8>,
    /// Public value the response is checked against.
    pub auxiliary: Vec<u8>,
}

/// A non-interactive proof-of-knowledge primitive.
pub trait ProofOfKnowledge: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Prove knowledge of `secret` at `bits` of security.
    fn prove(&self, secret: &[u8], bits: u32) -> Result<ProofTranscript, ProofError>;

    /// Check a transcript produced by [`prove()`](Self::prove) at the same
    /// security parameter.
    ///
    /// `Ok(false)` means well-formed but not accepted. `Err` means the
    /// transcript could not be interpreted at all.
    fn verify(&self, transcript: &ProofTranscript, bits: u32) -> Result<bool, ProofError>;
}

/// Accept security parameters in `[80, 256]` that are whole bytes.
pub fn check_security_bits(bits: u32) -> Result<(), ProofError> {
    if (MIN_SECURITY_BITS..=MAX_SECURITY_BITS).contains(&bits) && bits % 8 == 0 {
        Ok(())
    } else {
        Err(ProofError::InvalidSecurityParameter(bits))
    }
}
