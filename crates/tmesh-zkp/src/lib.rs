//! # tmesh-zkp — Location Proofs of Knowledge
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): [`ProofOfKnowledge`] is the opaque capability
//!   issuance depends on: `prove(secret, bits) -> (response, auxiliary)`.
//!   Callers never look inside a transcript.
//!
//! - **Schnorr** (`schnorr.rs`): [`SchnorrProver`], a Fiat–Shamir proof of
//!   knowledge over Ristretto255. The production prover.
//!
//! - **Mock** (`mock.rs`): [`MockProver`], deterministic and transparent,
//!   for tests. Behind the `mock` feature.
//!
//! - **Proof** (`proof.rs`): [`LocationProof`], [`prove_location()`] and
//!   [`prove_blinded_location()`], which feed a
//!   [`GeoCell`](tmesh_core::GeoCell) canonical string (salted, for the
//!   blinded form) to a prover and package the result as `"<hex>|<hex>"`.
//!
//! ## Crate Policy
//!
//! - Depends on `tmesh-core` and `tmesh-crypto` internally.
//! - No `unsafe` code.

#[cfg(feature = "mock")]
pub mod mock;
pub mod proof;
pub mod schnorr;
pub mod traits;

#[cfg(feature = "mock")]
pub use mock::MockProver;
pub use proof::{prove_blinded_location, prove_location, LocationProof};
pub use schnorr::SchnorrProver;
pub use traits::{ProofError, ProofOfKnowledge, ProofTranscript};
