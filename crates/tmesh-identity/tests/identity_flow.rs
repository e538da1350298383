//! End-to-end identity flow: issue, seal, decode, validate, publish.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use parking_lot::RwLock;
use tmesh_core::{CommitmentMode, IdentityConfig, IdentityError, ManualClock};
use tmesh_crypto::SymmetricKey;
use tmesh_identity::{
    decode, encode, envelope_key, seal_identity, DistributedHashTable, IdentityIssuer,
    IdentityRecord, NodeKey, NonceRegistry,
};
use tmesh_zkp::SchnorrProver;

const LIFETIME: i64 = 3600;

#[derive(Default)]
struct MemoryDht {
    entries: RwLock<HashMap<NodeKey, Vec<u8>>>,
}

impl DistributedHashTable for MemoryDht {
    type Error = Infallible;

    fn put(&self, key: &NodeKey, value: Vec<u8>) -> Result<(), Infallible> {
        self.entries.write().insert(*key, value);
        Ok(())
    }

    fn get(&self, key: &NodeKey) -> Result<Option<Vec<u8>>, Infallible> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn remove(&self, key: &NodeKey) -> Result<bool, Infallible> {
        Ok(self.entries.write().remove(key).is_some())
    }
}

struct Harness {
    clock: Arc<ManualClock>,
    registry: Arc<NonceRegistry>,
    issuer: IdentityIssuer,
}

fn harness(mode: CommitmentMode) -> Harness {
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let registry = Arc::new(NonceRegistry::new(LIFETIME, clock.clone()));
    let config = IdentityConfig {
        commitment_scheme: mode,
        ..IdentityConfig::default()
    };
    let issuer = IdentityIssuer::with_schnorr(config, registry.clone());
    Harness {
        clock,
        registry,
        issuer,
    }
}

#[test]
fn issue_seal_decode_validate_publish() {
    let h = harness(CommitmentMode::SelfBlinded);
    let issued = h.issuer.generate(37.7749, -122.4194).unwrap();
    let key = SymmetricKey::generate().unwrap();

    let envelope = seal_identity(&issued.identity, &h.registry, &key).unwrap();
    let received = decode(&envelope, &key).unwrap();

    assert_eq!(received, issued.record);
    assert!(h
        .registry
        .validate(&received.identity_key(), received.nonce()));
    assert!(received
        .zkp_proof()
        .unwrap()
        .verify_with(&SchnorrProver, issued.identity.security_bits())
        .unwrap());

    let dht = MemoryDht::default();
    let node = dht.publish(&received, &envelope).unwrap();
    assert_eq!(node, received.node_key());
    let stored = dht.get(&node).unwrap().unwrap();
    let fetched = decode(std::str::from_utf8(&stored).unwrap(), &key).unwrap();
    assert_eq!(fetched, received);
    assert!(dht.remove(&node).unwrap());
    assert!(dht.get(&node).unwrap().is_none());
}

#[test]
fn peers_share_an_envelope_key() {
    let h = harness(CommitmentMode::SelfBlinded);
    let alice = h.issuer.generate(51.5074, -0.1278).unwrap().identity;
    let bob = h.issuer.generate(40.7128, -74.0060).unwrap().identity;

    let alice_key = envelope_key(&alice.shared_secret(&bob.public_key()).unwrap());
    let bob_key = envelope_key(&bob.shared_secret(&alice.public_key()).unwrap());

    let envelope = seal_identity(&alice, &h.registry, &alice_key).unwrap();
    let record = decode(&envelope, &bob_key).unwrap();
    assert_eq!(record.public_key(), &alice.public_key());

    let eve = h.issuer.generate(0.0, 0.0).unwrap().identity;
    let eve_key = envelope_key(&eve.shared_secret(&alice.public_key()).unwrap());
    assert_eq!(
        decode(&envelope, &eve_key).unwrap_err(),
        IdentityError::AuthenticationFailure
    );
}

#[test]
fn replayed_envelope_fails_after_expiry() {
    let h = harness(CommitmentMode::SelfBlinded);
    let issued = h.issuer.generate(35.6762, 139.6503).unwrap();
    let key = SymmetricKey::generate().unwrap();
    let nonce = *issued.record.nonce();

    let envelope = encode(&issued.identity, &nonce, &key).unwrap();
    let replay = decode(&envelope, &key).unwrap();
    assert!(h.registry.validate(&replay.identity_key(), replay.nonce()));

    h.clock.advance(LIFETIME + 1);
    assert!(!h.registry.validate(&replay.identity_key(), replay.nonce()));

    // A fresh seal refreshes the nonce; the replayed one stays dead.
    let fresh = decode(&seal_identity(&issued.identity, &h.registry, &key).unwrap(), &key).unwrap();
    assert_ne!(fresh.nonce().value, replay.nonce().value);
    assert!(h.registry.validate(&fresh.identity_key(), fresh.nonce()));
    assert!(!h.registry.validate(&replay.identity_key(), replay.nonce()));

    h.clock.advance(LIFETIME + 1);
    assert_eq!(h.registry.prune(), 1);
    assert!(h.registry.is_empty());
}

#[test]
fn colocated_identities_are_distinguishable() {
    for mode in [CommitmentMode::SelfBlinded, CommitmentMode::RandomBlinded] {
        let h = harness(mode);
        let a = h.issuer.generate_identity(37.7749, -122.4194, 100.0, 256).unwrap();
        let b = h.issuer.generate_identity(37.77491, -122.41941, 100.0, 256).unwrap();
        assert_eq!(a.identity.cell(), b.identity.cell());
        assert_ne!(
            a.record.location_commitment(),
            b.record.location_commitment()
        );
        assert_ne!(a.record.node_key(), b.record.node_key());
    }
}

#[test]
fn record_json_wire_shape() {
    let h = harness(CommitmentMode::SelfBlinded);
    let issued = h.issuer.generate(37.7749, -122.4194).unwrap();
    let json = serde_json::to_value(&issued.record).unwrap();
    let obj = json.as_object().unwrap();

    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["locationCommitment", "nonce", "publicKey", "zkpProof"]);

    let proof = obj["zkpProof"].as_str().unwrap();
    let (response, auxiliary) = proof.split_once('|').unwrap();
    assert_eq!(response.len(), 128);
    assert_eq!(auxiliary.len(), 64);
    assert_eq!(obj["nonce"]["hash"].as_str().unwrap().len(), 64);

    let back: IdentityRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, issued.record);
}

#[test]
fn concurrent_issuance_and_validation() {
    let h = harness(CommitmentMode::SelfBlinded);
    let issuer = Arc::new(h.issuer);
    let registry = h.registry;

    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let issuer = Arc::clone(&issuer);
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let lat = 10.0 + f64::from(i);
                let issued = issuer.generate(lat, 20.0).unwrap();
                for _ in 0..50 {
                    assert!(registry.validate(&issued.record.identity_key(), issued.record.nonce()));
                }
                issued.record
            })
        })
        .collect();

    let records: Vec<IdentityRecord> = handles.into_iter().map(|t| t.join().unwrap()).collect();
    assert_eq!(registry.len(), records.len());
    for record in &records {
        assert!(registry.validate(&record.identity_key(), record.nonce()));
    }
}
