//! # tmesh-core — Foundational Types for TrustMesh Identities
//!
//! This crate is the leaf of the TrustMesh workspace. It defines the
//! types every other crate agrees on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Quantized locations only.** Raw coordinates enter through
//!    [`quantize()`] and leave as a [`GeoCell`]. Nothing downstream ever
//!    sees a latitude or longitude.
//!
//! 2. **Fixed-width cell bytes.** [`GeoCell::to_bytes()`] is the only
//!    commitment input. It never goes through a textual encoding, so a
//!    commitment is reproducible bit-for-bit across implementations.
//!
//! 3. **One error enum.** [`IdentityError`] carries every failure kind the
//!    identity subsystem can surface. Authentication and decoding failures
//!    render identically so the envelope codec cannot become an oracle.
//!
//! 4. **Injected time.** Expiry logic reads a [`Clock`], never the system
//!    time directly, so lifetimes can be tested without sleeping.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tmesh-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod geo;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use config::{CommitmentMode, IdentityConfig};
pub use error::IdentityError;
pub use geo::{default_precision, quantize, GeoCell, METERS_PER_DEGREE};
pub use temporal::{Clock, ManualClock, SystemClock};

/// Result alias used across the workspace.
pub type Result<T, E = IdentityError> = std::result::Result<T, E>;
