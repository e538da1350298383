//! # Identity Issuance
//!
//! An [`Identity`] owns a key pair, the quantized cell it was issued for,
//! the location commitment, the commitment scheme (and blinding factor, if
//! any), and the location proof. Its private material is never serialized;
//! only [`Identity::record()`] leaves the process.
//!
//! ## Atomicity
//!
//! [`IdentityIssuer::generate_identity()`] computes every component before
//! touching the nonce registry. Any failure before that point leaves no
//! trace, and the registry call is the single mutation. A caller sees a
//! complete identity or an error, never a partial one.

use std::sync::Arc;

use tmesh_core::{quantize, CommitmentMode, GeoCell, IdentityConfig, IdentityError};
use tmesh_crypto::{CommitmentScheme, KeyPair, LocationCommitment, PublicKey, SharedSecret};
use tmesh_zkp::{
    prove_blinded_location, prove_location, LocationProof, ProofOfKnowledge, SchnorrProver,
};

use crate::nonce::{key_prefix, NonceEntry, NonceRegistry};
use crate::record::IdentityRecord;

/// A locally held identity.
///
/// `Debug` redacts the cell; only the published parts are printed.
pub struct Identity {
    keys: KeyPair,
    cell: GeoCell,
    scheme: CommitmentScheme,
    commitment: LocationCommitment,
    proof: LocationProof,
    security_bits: u32,
}

impl Identity {
    /// The identity's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    /// Registry key: base64 of the public key.
    pub fn identity_key(&self) -> String {
        self.keys.public_key().to_base64()
    }

    /// The quantized cell. Stays local; only the commitment is published.
    pub fn cell(&self) -> &GeoCell {
        &self.cell
    }

    /// The published location commitment.
    pub fn commitment(&self) -> &LocationCommitment {
        &self.commitment
    }

    /// The construction and, for `RandomBlinded`, its blinding factor.
    pub fn commitment_scheme(&self) -> &CommitmentScheme {
        &self.scheme
    }

    /// Configuration tag of [`Self::commitment_scheme()`].
    pub fn commitment_mode(&self) -> CommitmentMode {
        self.scheme.mode()
    }

    /// The location proof published alongside the commitment.
    pub fn proof(&self) -> &LocationProof {
        &self.proof
    }

    /// Security parameter the proof was generated at.
    pub fn security_bits(&self) -> u32 {
        self.security_bits
    }

    /// Recompute the commitment from the held secrets and compare.
    pub fn verify_commitment(&self) -> bool {
        self.scheme
            .verify(&self.commitment, self.keys.private_scalar(), &self.cell.to_bytes())
    }

    /// Diffie–Hellman with a peer, for envelope keys.
    pub fn shared_secret(&self, peer: &PublicKey) -> Result<SharedSecret, IdentityError> {
        self.keys.shared_secret(peer)
    }

    /// The full public record under `nonce`.
    pub fn record(&self, nonce: NonceEntry) -> IdentityRecord {
        IdentityRecord::with_location(
            self.keys.public_key(),
            self.commitment,
            self.proof.clone(),
            nonce,
        )
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public_key", &self.keys.public_key())
            .field("cell", &"<private>")
            .field("scheme", &self.scheme)
            .field("commitment", &self.commitment)
            .field("proof", &self.proof)
            .field("security_bits", &self.security_bits)
            .finish()
    }
}

/// A freshly issued identity and its first public record.
#[derive(Debug)]
pub struct IssuedIdentity {
    /// The locally held identity, private material included.
    pub identity: Identity,
    /// Its first public record, carrying the registry nonce.
    pub record: IdentityRecord,
}

/// Issues identities against one nonce registry.
pub struct IdentityIssuer {
    config: IdentityConfig,
    prover: Arc<dyn ProofOfKnowledge>,
    registry: Arc<NonceRegistry>,
}

impl IdentityIssuer {
    /// Issuer with an explicit prover.
    pub fn new(
        config: IdentityConfig,
        prover: Arc<dyn ProofOfKnowledge>,
        registry: Arc<NonceRegistry>,
    ) -> Self {
        Self {
            config,
            prover,
            registry,
        }
    }

    /// Issuer using the Schnorr prover.
    pub fn with_schnorr(config: IdentityConfig, registry: Arc<NonceRegistry>) -> Self {
        Self::new(config, Arc::new(SchnorrProver::new()), registry)
    }

    /// Configuration this issuer was built with.
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// The nonce registry issued identities are recorded in.
    pub fn registry(&self) -> &Arc<NonceRegistry> {
        &self.registry
    }

    /// Issue an identity at the configured precision and security level.
    pub fn generate(&self, lat: f64, lon: f64) -> Result<IssuedIdentity, IdentityError> {
        self.generate_identity(
            lat,
            lon,
            self.config.precision_meters,
            self.config.security_bits,
        )
    }

    /// Issue an identity for `(lat, lon)`.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::InvalidPrecision`] for a non-positive precision.
    /// - [`IdentityError::InvalidSecurityParameter`] if the prover rejects `bits`.
    /// - [`IdentityError::EntropyExhausted`] if randomness is unavailable.
    pub fn generate_identity(
        &self,
        lat: f64,
        lon: f64,
        precision: f64,
        bits: u32,
    ) -> Result<IssuedIdentity, IdentityError> {
        let cell = quantize(lat, lon, precision)?;
        let keys = KeyPair::generate()?;
        let scheme = CommitmentScheme::for_mode(self.config.commitment_scheme)?;
        let commitment = scheme.commit(keys.private_scalar(), &cell.to_bytes());
        let proof = match &scheme {
            CommitmentScheme::SelfBlinded => {
                prove_location(self.prover.as_ref(), Some(&cell), bits)?
            }
            CommitmentScheme::RandomBlinded(blinding) => {
                prove_blinded_location(self.prover.as_ref(), Some(&cell), blinding, bits)?
            }
        };

        let identity = Identity {
            keys,
            cell,
            scheme,
            commitment,
            proof,
            security_bits: bits,
        };

        let nonce = self.registry.get_or_create(&identity.identity_key())?;
        let record = identity.record(nonce);

        let key = record.identity_key();
        tracing::info!(
            identity = key_prefix(&key),
            scheme = %self.config.commitment_scheme,
            prover = self.prover.name(),
            bits,
            "identity issued"
        );
        Ok(IssuedIdentity { identity, record })
    }
}

impl std::fmt::Debug for IdentityIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityIssuer")
            .field("config", &self.config)
            .field("prover", &self.prover.name())
            .field("registry", &self.registry)
            .finish()
    }
}
