//! # File Key Registry
//!
//! One encryption key may protect many files; the registry stores each
//! key once, keyed by the SHA-512 of its bytes, with a reference count
//! of the files using it. Counts are adjusted in batched deltas so a
//! re-key that touches an index shared with other files never disturbs
//! their references, and an entry disappears the moment its last file
//! is deleted or re-keyed away.
//!
//! Until published, `key` holds the ECIES ciphertext recorded at upload;
//! [`FileKeyMap::publish`] swaps in the plaintext after proving the
//! caller knows it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Hash, Key, StateError};

/// One encryption key and its reference count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileKey {
    /// SHA-512 of the key bytes.
    pub index: Hash,
    /// Number of files referencing this key.
    pub used: i32,
    /// Key material: ciphertext before publication, plaintext after.
    pub key: Key,
}

/// Reference-counted key registry, ordered by index for canonical
/// serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileKeyMap {
    /// Keys by index.
    pub keys: BTreeMap<Hash, FileKey>,
}

impl FileKeyMap {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-find `key` and return its index.
    ///
    /// With `count_it` the reference count is incremented; without it
    /// the call is idempotent and only guarantees the entry exists.
    pub fn add(&mut self, key: &str, count_it: bool) -> Result<Hash, StateError> {
        let index = sea_crypto::sha512_hex_from_hex(key).map_err(|_| StateError::InvalidKey)?;
        let entry = self.keys.entry(index.clone()).or_insert_with(|| FileKey {
            index: index.clone(),
            used: 0,
            key: key.to_string(),
        });
        if count_it {
            entry.used += 1;
        }
        Ok(index)
    }

    /// Look up a key by index.
    pub fn get(&self, index: &str) -> Option<&FileKey> {
        self.keys.get(index)
    }

    /// Look up a key by its content.
    pub fn search(&self, key: &str) -> Option<&FileKey> {
        let index = sea_crypto::sha512_hex_from_hex(key).ok()?;
        self.keys.get(&index)
    }

    /// Apply accumulated reference-count deltas.
    ///
    /// Entries reaching `used <= 0` are removed in the same pass.
    /// Deltas for unknown indices are skipped; deletes that race a
    /// share may legitimately reference an index already gone.
    pub fn apply_delta(&mut self, deltas: &BTreeMap<Hash, i32>) {
        for (index, delta) in deltas {
            if let Some(entry) = self.keys.get_mut(index) {
                entry.used += delta;
                if entry.used <= 0 {
                    self.keys.remove(index);
                }
            }
        }
    }

    /// Publish the plaintext `key` after verifying the caller knows it.
    ///
    /// The submitted plaintext is re-encrypted under `public_key` and
    /// must reproduce the ciphertext stored at upload time; on success
    /// the plaintext replaces it. Publishing an already-published key is
    /// a no-op, so the call is idempotent.
    pub fn publish(&mut self, public_key: &str, key: &str) -> Result<(), StateError> {
        let cipher = sea_crypto::encrypt(public_key, &sea_crypto::from_hex(key).map_err(|_| StateError::InvalidKey)?)
            .map_err(|_| StateError::InvalidKey)?;
        let cipher_hex = sea_crypto::to_hex(&cipher);
        let index = sea_crypto::sha512_hex_from_hex(&cipher_hex).map_err(|_| StateError::InvalidKey)?;
        let entry = self.keys.get_mut(&index).ok_or(StateError::InvalidKey)?;
        if entry.key == key {
            return Ok(());
        }
        if entry.key != cipher_hex {
            return Err(StateError::InvalidKey);
        }
        entry.key = key.to_string();
        Ok(())
    }
}
