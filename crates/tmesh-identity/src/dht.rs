//! # DHT Interface
//!
//! The identity subsystem does not run a distributed hash table. It supplies
//! the key a node is stored under and the shape of the store it expects.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tmesh_crypto::{LocationCommitment, PublicKey};

use crate::record::IdentityRecord;

const NODE_KEY_CONTEXT: &[u8] = b"trustmesh/dht-node-key/v1";

/// A 32-byte DHT node key: BLAKE3 over the public key, then the
/// commitment when one is present.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey([u8; 32]);

impl NodeKey {
    /// Derive the node key for an identity.
    pub fn derive(public_key: &PublicKey, commitment: Option<&LocationCommitment>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(NODE_KEY_CONTEXT);
        hasher.update(public_key.as_bytes());
        if let Some(c) = commitment {
            hasher.update(&c.to_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({})", hex::encode(&self.0[..8]))
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&text, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

/// Opaque key/value store keyed by node identity.
///
/// Implementations live outside this crate.
pub trait DistributedHashTable: Send + Sync {
    /// Store-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &NodeKey, value: Vec<u8>) -> Result<(), Self::Error>;

    /// Fetch the value under `key`.
    fn get(&self, key: &NodeKey) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Delete `key`. Returns whether anything was removed.
    fn remove(&self, key: &NodeKey) -> Result<bool, Self::Error>;

    /// Store a sealed envelope under the record's node key.
    fn publish(&self, record: &IdentityRecord, envelope: &str) -> Result<NodeKey, Self::Error> {
        let key = record.node_key();
        self.put(&key, envelope.as_bytes().to_vec())?;
        tracing::debug!(node = ?key, "identity published");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmesh_core::quantize;
    use tmesh_crypto::{commit, KeyPair};

    #[test]
    fn node_key_depends_on_commitment() {
        let kp = KeyPair::from_seed(&[4u8; 32]);
        let cell = quantize(10.0, 10.0, 100.0).unwrap().to_bytes();
        let c = commit(kp.private_scalar(), &cell);
        let bare = NodeKey::derive(&kp.public_key(), None);
        let with = NodeKey::derive(&kp.public_key(), Some(&c));
        assert_ne!(bare, with);
        assert_eq!(with, NodeKey::derive(&kp.public_key(), Some(&c)));
    }

    #[test]
    fn node_key_serializes_as_hex() {
        let kp = KeyPair::from_seed(&[4u8; 32]);
        let key = NodeKey::derive(&kp.public_key(), None);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json.len(), 64 + 2);
        assert_eq!(serde_json::from_str::<NodeKey>(&json).unwrap(), key);
    }
}
