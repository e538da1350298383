//! # Identity Envelope Codec
//!
//! Turns an identity record into one base64 string for transport, and back.
//!
//! ```text
//! encode:  record ──JSON──▶ plaintext ──seal(key)──▶ nonce ‖ ct ‖ tag ──base64──▶ text
//! decode:  text ──base64──▶ sealed ──open(key)──▶ plaintext ──JSON──▶ record
//! ```
//!
//! ## Failure Reporting
//!
//! Anything wrong with the envelope before the AEAD tag verifies (bad
//! base64, truncation, tampering, wrong key) is `AuthenticationFailure`.
//! A plaintext that authenticates but is not a well-formed record is
//! `Decoding`. Both display as `"decode failed"`; which one occurred is only
//! visible in logs and `Debug`.
//!
//! ## Keys
//!
//! The codec takes a ready 32-byte [`SymmetricKey`] and never derives one.
//! Peers that share a Diffie–Hellman secret can use [`envelope_key()`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tmesh_core::IdentityError;
use tmesh_crypto::{open, seal, SharedSecret, SymmetricKey};

use crate::identity::Identity;
use crate::nonce::{NonceEntry, NonceRegistry};
use crate::record::IdentityRecord;

/// BLAKE3 derive-key context for envelope keys.
pub const ENVELOPE_KEY_CONTEXT: &str = "trustmesh 2024 identity envelope key v1";

/// Envelope key for a pair of peers.
pub fn envelope_key(secret: &SharedSecret) -> SymmetricKey {
    secret.derive_key(ENVELOPE_KEY_CONTEXT)
}

/// Seal the minimal record: public key and nonce only.
///
/// # Errors
///
/// - [`IdentityError::Encoding`] if the record cannot be serialized.
/// - [`IdentityError::Seal`] if sealing fails; retrying draws a fresh IV.
pub fn encode(
    identity: &Identity,
    nonce: &NonceEntry,
    key: &SymmetricKey,
) -> Result<String, IdentityError> {
    encode_record(&IdentityRecord::new(identity.public_key(), *nonce), key)
}

/// Seal an arbitrary record.
pub fn encode_record(record: &IdentityRecord, key: &SymmetricKey) -> Result<String, IdentityError> {
    let plaintext =
        serde_json::to_vec(record).map_err(|e| IdentityError::Encoding(e.to_string()))?;
    let sealed = seal(&plaintext, key)?;
    Ok(STANDARD.encode(sealed))
}

/// Open and parse an envelope.
///
/// # Errors
///
/// - [`IdentityError::AuthenticationFailure`] if the envelope does not
///   authenticate under `key`.
/// - [`IdentityError::Decoding`] if it authenticates but does not hold a
///   well-formed record.
pub fn decode(text: &str, key: &SymmetricKey) -> Result<IdentityRecord, IdentityError> {
    let sealed = STANDARD.decode(text.trim()).map_err(|e| {
        tracing::warn!(reason = %e, "envelope rejected: not base64");
        IdentityError::AuthenticationFailure
    })?;
    let plaintext = open(&sealed, key).map_err(|e| {
        tracing::warn!("envelope rejected: authentication failed");
        e
    })?;
    serde_json::from_slice(&plaintext).map_err(|e| {
        tracing::warn!(reason = %e, "envelope rejected: malformed record");
        IdentityError::Decoding(e.to_string())
    })
}

/// Fetch or create the identity's nonce and seal its full record.
pub fn seal_identity(
    identity: &Identity,
    registry: &NonceRegistry,
    key: &SymmetricKey,
) -> Result<String, IdentityError> {
    let nonce = registry.get_or_create(&identity.identity_key())?;
    encode_record(&identity.record(nonce), key)
}
