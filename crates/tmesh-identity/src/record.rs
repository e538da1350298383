//! # Identity Record
//!
//! The externally visible shape of an identity:
//!
//! ```json
//! {
//!   "publicKey": "<base64>",
//!   "locationCommitment": "<base64>",
//!   "zkpProof": "<response_hex>|<auxiliary_hex>",
//!   "nonce": { "value": 1, "hash": "<hex32>", "timestamp": 1700000000 }
//! }
//! ```
//!
//! `locationCommitment` and `zkpProof` are omitted when absent. A record is
//! never edited after it is built; a new key or location means a new record.

use serde::{Deserialize, Serialize};
use tmesh_crypto::{LocationCommitment, PublicKey};
use tmesh_zkp::LocationProof;

use crate::dht::NodeKey;
use crate::nonce::NonceEntry;

/// Public identity fields plus the nonce that guards them against replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IdentityRecord {
    public_key: PublicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location_commitment: Option<LocationCommitment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zkp_proof: Option<LocationProof>,
    nonce: NonceEntry,
}

impl IdentityRecord {
    /// Record carrying only the public key and nonce.
    pub fn new(public_key: PublicKey, nonce: NonceEntry) -> Self {
        Self {
            public_key,
            location_commitment: None,
            zkp_proof: None,
            nonce,
        }
    }

    /// Record carrying the location commitment and its proof.
    pub fn with_location(
        public_key: PublicKey,
        commitment: LocationCommitment,
        proof: LocationProof,
        nonce: NonceEntry,
    ) -> Self {
        Self {
            public_key,
            location_commitment: Some(commitment),
            zkp_proof: Some(proof),
            nonce,
        }
    }

    /// The identity's public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Location commitment, absent on location-free records.
    pub fn location_commitment(&self) -> Option<&LocationCommitment> {
        self.location_commitment.as_ref()
    }

    /// Location proof, present exactly when the commitment is.
    pub fn zkp_proof(&self) -> Option<&LocationProof> {
        self.zkp_proof.as_ref()
    }

    /// Registry nonce the record was issued under.
    pub fn nonce(&self) -> &NonceEntry {
        &self.nonce
    }

    /// Key the nonce registry files this identity under.
    pub fn identity_key(&self) -> String {
        self.public_key.to_base64()
    }

    /// Key a DHT stores this identity under.
    pub fn node_key(&self) -> NodeKey {
        NodeKey::derive(&self.public_key, self.location_commitment.as_ref())
    }
}
