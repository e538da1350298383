//! # Location Proofs
//!
//! Packages a prover transcript over a [`GeoCell`] for transport.
//!
//! The secret fed to the prover is [`GeoCell::canonical_string()`], or for
//! random-blinded identities that string followed by the blinding factor
//! ([`prove_blinded_location()`]). A prover's public value is a function of
//! its secret, so an unsalted proof over a cell can be matched by anyone
//! enumerating candidate cells; salting with the blinding factor keeps the
//! proof as hiding as the commitment it accompanies. The mock prover
//! publishes its secret and must never carry a salted one outside tests.
//!
//! The wire form is `"<response_hex>|<auxiliary_hex>"` in lowercase hex. This
//! module never judges a proof; acceptance is the verifier's call through
//! [`LocationProof::verify_with()`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tmesh_core::{GeoCell, IdentityError};
use tmesh_crypto::BlindingFactor;
use zeroize::Zeroizing;

use crate::traits::{ProofOfKnowledge, ProofTranscript};

/// Separator between the two hex fields of the wire form.
pub const PROOF_DELIMITER: char = '|';

/// A proof bound to one location commitment by issuance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationProof {
    response: Vec<u8>,
    auxiliary: Vec<u8>,
}

impl LocationProof {
    /// Wrap a prover transcript.
    pub fn from_transcript(transcript: ProofTranscript) -> Self {
        Self {
            response: transcript.response,
            auxiliary: transcript.auxiliary,
        }
    }

    /// Prover response bytes.
    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// Auxiliary value bytes.
    pub fn auxiliary(&self) -> &[u8] {
        &self.auxiliary
    }

    /// Hand the proof back to a prover for checking.
    pub fn verify_with(
        &self,
        prover: &dyn ProofOfKnowledge,
        bits: u32,
    ) -> Result<bool, IdentityError> {
        let transcript = ProofTranscript {
            response: self.response.clone(),
            auxiliary: self.auxiliary.clone(),
        };
        Ok(prover.verify(&transcript, bits)?)
    }
}

/// Prove knowledge of `cell`'s canonical string at `bits` of security.
///
/// # Errors
///
/// - [`IdentityError::EmptyLocation`] if `cell` is `None`.
/// - [`IdentityError::InvalidSecurityParameter`] if the prover rejects `bits`.
pub fn prove_location(
    prover: &dyn ProofOfKnowledge,
    cell: Option<&GeoCell>,
    bits: u32,
) -> Result<LocationProof, IdentityError> {
    let cell = cell.ok_or(IdentityError::EmptyLocation)?;
    let secret = cell.canonical_string();
    let transcript = prover.prove(secret.as_bytes(), bits)?;
    tracing::debug!(prover = prover.name(), bits, "location proof generated");
    Ok(LocationProof::from_transcript(transcript))
}

/// Separates the cell string from the blinding factor in a salted secret.
const BLINDING_SEPARATOR: u8 = b'#';

/// Prove knowledge of `cell`'s canonical string salted with `blinding`.
///
/// The secret is `canonical_string ‖ '#' ‖ blinding` and is wiped after
/// proving. Errors as [`prove_location()`].
pub fn prove_blinded_location(
    prover: &dyn ProofOfKnowledge,
    cell: Option<&GeoCell>,
    blinding: &BlindingFactor,
    bits: u32,
) -> Result<LocationProof, IdentityError> {
    let cell = cell.ok_or(IdentityError::EmptyLocation)?;
    let mut secret = Zeroizing::new(cell.canonical_string().into_bytes());
    secret.push(BLINDING_SEPARATOR);
    secret.extend_from_slice(&Zeroizing::new(blinding.to_bytes())[..]);
    let transcript = prover.prove(&secret, bits)?;
    tracing::debug!(prover = prover.name(), bits, "blinded location proof generated");
    Ok(LocationProof::from_transcript(transcript))
}

impl fmt::Display for LocationProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{PROOF_DELIMITER}{}",
            hex::encode(&self.response),
            hex::encode(&self.auxiliary)
        )
    }
}

impl FromStr for LocationProof {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (response_hex, auxiliary_hex) = s
            .split_once(PROOF_DELIMITER)
            .ok_or_else(|| IdentityError::Decoding("proof is missing its delimiter".to_string()))?;
        if auxiliary_hex.contains(PROOF_DELIMITER) {
            return Err(IdentityError::Decoding(
                "proof has more than two fields".to_string(),
            ));
        }
        let response = hex::decode(response_hex)
            .map_err(|e| IdentityError::Decoding(format!("proof response: {e}")))?;
        let auxiliary = hex::decode(auxiliary_hex)
            .map_err(|e| IdentityError::Decoding(format!("proof auxiliary: {e}")))?;
        Ok(Self {
            response,
            auxiliary,
        })
    }
}

impl Serialize for LocationProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocationProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
