//! # tmesh-identity — Anonymized Network Identities
//!
//! Issues identities that bind a Ristretto255 key pair to a quantized
//! location without publishing the location, and moves them between peers
//! in authenticated envelopes.
//!
//! ## Flow
//!
//! ```text
//! (lat, lon) ─quantize─▶ GeoCell ─commit─▶ LocationCommitment ─┐
//!                           └──prove_location──▶ LocationProof ├─▶ IdentityRecord ─seal─▶ envelope
//!                               NonceRegistry::get_or_create ──┘
//! ```
//!
//! ## Modules
//!
//! - **nonce**: [`NonceRegistry`], the only shared mutable state.
//! - **identity**: [`IdentityIssuer`] and the locally held [`Identity`].
//! - **record**: [`IdentityRecord`], the wire shape.
//! - **envelope**: JSON + XChaCha20-Poly1305 + base64 codec.
//! - **dht**: [`NodeKey`] and the [`DistributedHashTable`] interface.
//!
//! ## Crate Policy
//!
//! - Private scalars, blinding factors, shared secrets and raw coordinates
//!   are never logged or serialized.
//! - No `unsafe` code.

pub mod dht;
pub mod envelope;
pub mod identity;
pub mod nonce;
pub mod record;

pub use dht::{DistributedHashTable, NodeKey};
pub use envelope::{decode, encode, encode_record, envelope_key, seal_identity};
pub use identity::{Identity, IdentityIssuer, IssuedIdentity};
pub use nonce::{NonceEntry, NonceRegistry};
pub use record::IdentityRecord;
