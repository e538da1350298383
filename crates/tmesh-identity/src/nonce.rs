//! # Nonce Registry
//!
//! Process-wide replay protection for identity assertions. Maps an identity
//! key (base64 public key) to at most one live [`NonceEntry`].
//!
//! ## Lifecycle
//!
//! ```text
//! ABSENT ──get_or_create──▶ ACTIVE ──(now − ts > lifetime)──▶ EXPIRED ──prune──▶ ABSENT
//!                              ▲                                 │
//!                              └────────get_or_create────────────┘  (refresh: value + 1)
//! ```
//!
//! The first value for an identity is a random non-zero `u32`. Refreshing an
//! expired entry that has not been pruned yet advances the value by one, so
//! an old assertion can never match the refreshed entry.
//!
//! ## Locking
//!
//! `get_or_create` and `prune` take the write lock; `validate` takes the
//! read lock, so validations run in parallel. An expired entry fails
//! `validate` whether or not `prune` has run.
//!
//! ## Ownership
//!
//! The registry is an ordinary value. Construct one with [`NonceRegistry::init()`]
//! at process start, share it through an `Arc`, and end it with
//! [`NonceRegistry::shutdown()`] once every issuer holding a clone has been
//! dropped. Tests build as many independent registries as they like.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tmesh_core::{Clock, IdentityConfig, IdentityError, SystemClock};
use tmesh_crypto::entropy::random_u32;
use tmesh_crypto::{nonce_hash, NonceHash};

/// A per-identity freshness token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceEntry {
    /// Counter value.
    pub value: u32,
    /// BLAKE3 digest of `value` as four big-endian bytes.
    #[serde(with = "hex_hash")]
    pub hash: NonceHash,
    /// Issuance time, epoch seconds.
    pub timestamp: i64,
}

impl NonceEntry {
    /// Build an entry, computing its hash.
    pub fn new(value: u32, timestamp: i64) -> Self {
        Self {
            value,
            hash: nonce_hash(value),
            timestamp,
        }
    }

    /// Whether this entry is past its lifetime at `now`.
    pub fn is_expired(&self, now: i64, lifetime_secs: i64) -> bool {
        now.saturating_sub(self.timestamp) > lifetime_secs
    }
}

mod hex_hash {
    use serde::{Deserialize, Deserializer, Serializer};
    use tmesh_crypto::NonceHash;

    pub fn serialize<S: Serializer>(hash: &NonceHash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NonceHash, D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut out = NonceHash::default();
        hex::decode_to_slice(&text, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}

fn next_value(value: u32) -> u32 {
    match value.wrapping_add(1) {
        0 => 1,
        v => v,
    }
}

fn fresh_value() -> Result<u32, IdentityError> {
    loop {
        let v = random_u32()?;
        if v != 0 {
            return Ok(v);
        }
    }
}

pub(crate) fn key_prefix(identity_key: &str) -> &str {
    identity_key.get(..8).unwrap_or(identity_key)
}

/// Thread-safe map from identity key to its live nonce.
pub struct NonceRegistry {
    entries: RwLock<HashMap<String, NonceEntry>>,
    lifetime_secs: i64,
    clock: Arc<dyn Clock>,
}

impl NonceRegistry {
    /// Process-start constructor: configured lifetime, system clock.
    pub fn init(config: &IdentityConfig) -> Self {
        tracing::info!(
            lifetime_secs = config.nonce_lifetime_secs,
            "nonce registry initialized"
        );
        Self::new(config.nonce_lifetime_secs, Arc::new(SystemClock))
    }

    /// Registry with an explicit lifetime and clock.
    pub fn new(lifetime_secs: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            lifetime_secs,
            clock,
        }
    }

    /// Configured entry lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Return the live nonce for `identity_key`, creating or refreshing it.
    ///
    /// # Errors
    ///
    /// [`IdentityError::EntropyExhausted`] if a first value could not be
    /// drawn. The registry is unchanged in that case.
    pub fn get_or_create(&self, identity_key: &str) -> Result<NonceEntry, IdentityError> {
        let now = self.clock.now_epoch_secs();
        let mut entries = self.entries.write();

        let entry = match entries.get(identity_key) {
            Some(existing) if !existing.is_expired(now, self.lifetime_secs) => {
                return Ok(*existing);
            }
            Some(expired) => {
                let refreshed = NonceEntry::new(next_value(expired.value), now);
                tracing::debug!(
                    identity = key_prefix(identity_key),
                    "refreshed expired nonce"
                );
                refreshed
            }
            None => {
                let created = NonceEntry::new(fresh_value()?, now);
                tracing::debug!(identity = key_prefix(identity_key), "created nonce");
                created
            }
        };

        entries.insert(identity_key.to_owned(), entry);
        Ok(entry)
    }

    /// Whether `nonce` is the live, unexpired nonce for `identity_key`.
    pub fn validate(&self, identity_key: &str, nonce: &NonceEntry) -> bool {
        let now = self.clock.now_epoch_secs();
        let entries = self.entries.read();
        let Some(entry) = entries.get(identity_key) else {
            return false;
        };
        let hash_matches: bool = entry.hash.ct_eq(&nonce.hash).into();
        entry.value == nonce.value && hash_matches && !entry.is_expired(now, self.lifetime_secs)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let now = self.clock.now_epoch_secs();
        let lifetime = self.lifetime_secs;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, lifetime));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = entries.len(), "pruned expired nonces");
        }
        removed
    }

    /// Number of stored entries, expired ones included until pruned.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Process-end teardown. Discards every entry and returns how many
    /// there were.
    ///
    /// # Errors
    ///
    /// Hands the `Arc` back untouched while other clones are still alive.
    pub fn shutdown(self: Arc<Self>) -> Result<usize, Arc<Self>> {
        let registry = Arc::try_unwrap(self)?;
        let count = registry.entries.into_inner().len();
        tracing::info!(entries = count, "nonce registry shut down");
        Ok(count)
    }
}

impl std::fmt::Debug for NonceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceRegistry")
            .field("entries", &self.len())
            .field("lifetime_secs", &self.lifetime_secs)
            .finish()
    }
}
