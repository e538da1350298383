//! # tmesh-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for TrustMesh identities:
//!
//! - **Key pairs** over Ristretto255 (`public = private · G`).
//! - **Location commitments** binding a private scalar and a [`GeoCell`]
//!   to a group element, in self-blinded and random-blinded variants.
//! - **Diffie–Hellman** shared-secret derivation between peers.
//! - **Digests**: hash-to-scalar (SHA-512) and the BLAKE3 nonce hash.
//! - **AEAD**: XChaCha20-Poly1305 seal/open with a random prepended nonce.
//!
//! ## Crate Policy
//!
//! - Depends only on `tmesh-core` internally.
//! - Secret material is zeroized on drop and redacted in `Debug`.
//! - Every draw from the OS entropy source is fallible and surfaces
//!   `IdentityError::EntropyExhausted` instead of panicking.
//!
//! [`GeoCell`]: tmesh_core::GeoCell

pub mod aead;
pub mod commitment;
pub mod digest;
pub mod entropy;
pub mod exchange;
pub mod keys;

mod b64;

pub use aead::{open, seal, SymmetricKey};
pub use commitment::{commit, BlindingFactor, CommitmentScheme, LocationCommitment};
pub use digest::{hash_to_scalar, nonce_hash, NonceHash};
pub use exchange::{derive_shared_secret, SharedSecret};
pub use keys::{KeyPair, PrivateScalar, PublicKey};
