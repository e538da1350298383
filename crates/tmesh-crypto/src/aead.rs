//! # XChaCha20-Poly1305 Sealing
//!
//! The authenticated-encryption collaborator of the envelope codec.
//!
//! Sealed format: `[nonce (24 bytes)][ciphertext + tag (16 bytes)]`.
//!
//! ## Security Notes
//!
//! - A fresh 192-bit nonce is drawn from the OS CSPRNG on every call. Nonces
//!   are never reused under the same key.
//! - Keys are zeroized on drop and must be exactly [`KEY_SIZE`] bytes; no key
//!   stretching happens here.
//! - Every `open` failure, including truncated input, is
//!   `AuthenticationFailure`.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use tmesh_core::IdentityError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::entropy::fill_random;

/// Size of a symmetric key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the prepended nonce in bytes.
pub const NONCE_SIZE: usize = 24;

/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A 256-bit AEAD key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Generate a random key.
    pub fn generate() -> Result<Self, IdentityError> {
        let mut bytes = [0u8; KEY_SIZE];
        fill_random(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Create a key from raw bytes.
    ///
    /// # Errors
    ///
    /// [`IdentityError::InvalidKeyLength`] unless `bytes` is exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        if bytes.len() != KEY_SIZE {
            return Err(IdentityError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    pub(crate) fn from_array(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Raw key bytes. Avoid logging or persisting them.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Encrypt and authenticate `plaintext`, returning `nonce || ciphertext`.
///
/// # Errors
///
/// - [`IdentityError::EntropyExhausted`] if no nonce could be drawn.
/// - [`IdentityError::Seal`] if the cipher rejects the input; retrying
///   draws a fresh nonce.
pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, IdentityError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let mut nonce = [0u8; NONCE_SIZE];
    fill_random(&mut nonce)?;

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| IdentityError::Seal("XChaCha20-Poly1305 encryption failed".to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Verify and decrypt the output of [`seal()`].
///
/// # Errors
///
/// [`IdentityError::AuthenticationFailure`] on any tampering, wrong key, or
/// truncated input.
pub fn open(sealed: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, IdentityError> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(IdentityError::AuthenticationFailure);
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| IdentityError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open() {
        let key = SymmetricKey::generate().unwrap();
        let sealed = seal(b"identity record", &key).unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + b"identity record".len() + TAG_SIZE);
        assert_eq!(open(&sealed, &key).unwrap(), b"identity record");
    }

    #[test]
    fn nonce_is_fresh_per_call() {
        let key = SymmetricKey::generate().unwrap();
        let a = seal(b"same", &key).unwrap();
        let b = seal(b"same", &key).unwrap();
        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let key = SymmetricKey::generate().unwrap();
        let other = SymmetricKey::generate().unwrap();
        let sealed = seal(b"secret", &key).unwrap();
        assert_eq!(
            open(&sealed, &other).unwrap_err(),
            IdentityError::AuthenticationFailure
        );
    }

    #[test]
    fn every_flipped_byte_fails_authentication() {
        let key = SymmetricKey::generate().unwrap();
        let sealed = seal(b"tamper me", &key).unwrap();
        for i in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                open(&tampered, &key).unwrap_err(),
                IdentityError::AuthenticationFailure,
                "byte {i} flip went undetected"
            );
        }
    }

    #[test]
    fn truncated_input_fails_authentication() {
        let key = SymmetricKey::generate().unwrap();
        assert_eq!(
            open(&[0u8; NONCE_SIZE + TAG_SIZE - 1], &key).unwrap_err(),
            IdentityError::AuthenticationFailure
        );
        assert!(open(&[], &key).is_err());
    }

    #[test]
    fn key_length_is_enforced() {
        assert!(SymmetricKey::from_bytes(&[0u8; 32]).is_ok());
        assert_eq!(
            SymmetricKey::from_bytes(&[0u8; 16]).unwrap_err(),
            IdentityError::InvalidKeyLength {
                expected: 32,
                actual: 16
            }
        );
    }

    #[test]
    fn debug_is_redacted() {
        let key = SymmetricKey::from_bytes(&[9u8; 32]).unwrap();
        assert_eq!(format!("{key:?}"), "SymmetricKey([REDACTED])");
    }
}
