//! # Error Types — Identity Subsystem Failures
//!
//! Every operation of the identity subsystem surfaces one of these kinds
//! as a typed result. Nothing is retried internally.
//!
//! ## Wire Indistinguishability
//!
//! `AuthenticationFailure` and `Decoding` are separate variants so that
//! diagnostics can tell them apart, but their `Display` output is the same
//! string. Anything that crosses the wire must use `Display` (or
//! [`IdentityError::public_message()`]); the detail stays in `Debug`.

use thiserror::Error;

/// Message shown externally for every envelope decoding failure.
pub const DECODE_FAILED: &str = "decode failed";

/// Top-level error type for TrustMesh identities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentityError {
    /// Grid precision must be a finite, strictly positive number of meters.
    #[error("invalid precision: {0} (must be > 0 meters)")]
    InvalidPrecision(f64),

    /// The peer point is not a valid group element, or is the identity.
    #[error("invalid peer key: {0}")]
    InvalidPeerKey(String),

    /// A location proof was requested without a location.
    #[error("no location to prove")]
    EmptyLocation,

    /// The operating system entropy source failed. Fatal.
    #[error("entropy source exhausted: {0}")]
    EntropyExhausted(String),

    /// The proof primitive does not support this security parameter.
    #[error("unsupported security parameter: {0} bits")]
    InvalidSecurityParameter(u32),

    /// The proof primitive failed.
    #[error("proof error: {0}")]
    Proof(String),

    /// The identity record could not be serialized.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Symmetric key has the wrong length for the cipher.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length.
        expected: usize,
        /// Supplied key length.
        actual: usize,
    },

    /// AEAD sealing failed. Retryable with a fresh IV.
    #[error("seal error: {0}")]
    Seal(String),

    /// The AEAD tag did not verify (tampering or wrong key).
    #[error("decode failed")]
    AuthenticationFailure,

    /// The authenticated plaintext is not a well-formed identity record.
    #[error("decode failed")]
    Decoding(String),

    /// Configuration value rejected.
    #[error("configuration error: {0}")]
    Config(String),
}

impl IdentityError {
    /// Whether the caller may retry the same operation unchanged.
    ///
    /// Only sealing qualifies: a retry draws a fresh IV.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Seal(_))
    }

    /// Whether the failure is fatal for the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EntropyExhausted(_))
    }

    /// The message safe to send to a remote party.
    pub fn public_message(&self) -> String {
        self.to_string()
    }

    /// Internal diagnostic detail. Never send this over the wire.
    pub fn detail(&self) -> String {
        match self {
            Self::AuthenticationFailure => "AEAD tag verification failed".to_string(),
            Self::Decoding(detail) => format!("malformed plaintext: {detail}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_decoding_failures_render_identically() {
        let auth = IdentityError::AuthenticationFailure;
        let decoding = IdentityError::Decoding("missing field `nonce`".to_string());
        assert_eq!(auth.to_string(), decoding.to_string());
        assert_eq!(auth.public_message(), DECODE_FAILED);
        assert!(!decoding.public_message().contains("nonce"));
    }

    #[test]
    fn detail_keeps_diagnostics() {
        let decoding = IdentityError::Decoding("missing field `nonce`".to_string());
        assert!(decoding.detail().contains("nonce"));
        assert_ne!(
            IdentityError::AuthenticationFailure.detail(),
            decoding.detail()
        );
    }

    #[test]
    fn only_seal_is_retryable() {
        assert!(IdentityError::Seal("x".into()).is_retryable());
        assert!(!IdentityError::AuthenticationFailure.is_retryable());
        assert!(!IdentityError::EntropyExhausted("x".into()).is_retryable());
        assert!(!IdentityError::InvalidPrecision(0.0).is_retryable());
    }

    #[test]
    fn only_entropy_exhaustion_is_fatal() {
        assert!(IdentityError::EntropyExhausted("os rng".into()).is_fatal());
        assert!(!IdentityError::Seal("x".into()).is_fatal());
        assert!(!IdentityError::EmptyLocation.is_fatal());
    }

    #[test]
    fn invalid_key_length_display() {
        let msg = IdentityError::InvalidKeyLength {
            expected: 32,
            actual: 16,
        }
        .to_string();
        assert!(msg.contains("32"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn invalid_precision_display() {
        let msg = IdentityError::InvalidPrecision(-5.0).to_string();
        assert!(msg.contains("-5"));
    }
}
