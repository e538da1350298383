//! # Digests
//!
//! - [`hash_to_scalar()`] is the group's canonical hash-to-scalar map:
//!   SHA-512 followed by wide reduction modulo the Ristretto255 group order.
//! - [`nonce_hash()`] binds a registry nonce value: BLAKE3 over the value as
//!   four big-endian bytes.

use curve25519_dalek::Scalar;
use sha2::Sha512;

/// Length of a [`NonceHash`].
pub const NONCE_HASH_SIZE: usize = 32;

/// BLAKE3 digest of a nonce value.
pub type NonceHash = [u8; NONCE_HASH_SIZE];

/// Hash arbitrary bytes to a scalar.
pub fn hash_to_scalar(bytes: &[u8]) -> Scalar {
    Scalar::hash_from_bytes::<Sha512>(bytes)
}

/// Digest of a nonce value: `BLAKE3(value as u32 big-endian)`.
pub fn nonce_hash(value: u32) -> NonceHash {
    *blake3::hash(&value.to_be_bytes()).as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_to_scalar_is_deterministic() {
        assert_eq!(hash_to_scalar(b"cell"), hash_to_scalar(b"cell"));
        assert_ne!(hash_to_scalar(b"cell"), hash_to_scalar(b"cell2"));
    }

    #[test]
    fn nonce_hash_matches_blake3_of_big_endian_value() {
        let expected = blake3::hash(&[0, 0, 0, 1]);
        assert_eq!(&nonce_hash(1), expected.as_bytes());
    }

    #[test]
    fn nonce_hash_distinguishes_values() {
        assert_ne!(nonce_hash(1), nonce_hash(2));
        assert_ne!(nonce_hash(1), nonce_hash(1 << 24));
    }
}
