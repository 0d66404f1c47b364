//! # Proof-of-Custody Operations
//!
//! When an owner grants a fragment to a sea they hand it a signed
//! operation record. The sea submits the record with its store
//! transaction; the processor re-derives the signed bytes and checks
//! the signature against the owner key embedded in the record, and the
//! runtime separately requires the submitting signer to be the sea the
//! record names.
//!
//! The freshness check is a policy, not a constant: deployments disagree
//! on whether a record is stale when its timestamp lies in the future or
//! when it has aged past a window, so both predicates are available.

use serde::{Deserialize, Serialize};

use crate::{Address, Hash};

/// Freshness predicate for operation timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlinePolicy {
    /// Accept any timestamp not in the future.
    NotInFuture,
    /// Accept timestamps not in the future and at most this many
    /// seconds old.
    Window(i64),
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        DeadlinePolicy::NotInFuture
    }
}

impl DeadlinePolicy {
    /// Whether a record stamped at `timestamp` is acceptable at `now`
    /// (both Unix seconds).
    pub fn accepts(&self, timestamp: i64, now: i64) -> bool {
        match self {
            DeadlinePolicy::NotInFuture => timestamp <= now,
            DeadlinePolicy::Window(window) => timestamp <= now && now <= timestamp + window,
        }
    }
}

/// A signed grant: the owner authorizes one sea to hold one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Ledger address of the owner.
    pub address: Address,
    /// Owner public key; the signature verifies against this.
    pub owner: Hash,
    /// Public key of the sea being granted the fragment.
    pub sea: Hash,
    /// Parent path of the file, `/`-terminated.
    pub path: String,
    /// File name.
    pub name: String,
    /// Fragment hash.
    pub hash: Hash,
    /// Fragment size in bytes.
    pub size: i64,
    /// Unix seconds at which the grant was issued.
    pub timestamp: i64,
    /// Hex signature over [`Operation::signing_bytes`].
    pub signature: String,
}

impl Operation {
    /// Create and sign a grant with the owner's private key.
    #[allow(clippy::too_many_arguments)]
    pub fn sign(
        address: &str,
        owner: &str,
        sea: &str,
        path: &str,
        name: &str,
        hash: &str,
        size: i64,
        timestamp: i64,
        private_key: &str,
    ) -> Result<Self, sea_crypto::CryptoError> {
        let mut operation = Self {
            address: address.to_string(),
            owner: owner.to_string(),
            sea: sea.to_string(),
            path: path.to_string(),
            name: name.to_string(),
            hash: hash.to_string(),
            size,
            timestamp,
            signature: String::new(),
        };
        operation.signature = sea_crypto::sign(private_key, &operation.signing_bytes())?;
        Ok(operation)
    }

    /// The byte string the signature covers: every field in declaration
    /// order, size as big-endian u64, timestamp in ASCII decimal.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(self.address.as_bytes());
        bytes.extend_from_slice(self.owner.as_bytes());
        bytes.extend_from_slice(self.sea.as_bytes());
        bytes.extend_from_slice(self.path.as_bytes());
        bytes.extend_from_slice(self.name.as_bytes());
        bytes.extend_from_slice(self.hash.as_bytes());
        bytes.extend_from_slice(&(self.size as u64).to_be_bytes());
        bytes.extend_from_slice(self.timestamp.to_string().as_bytes());
        bytes
    }

    /// Verify the signature against the embedded owner key.
    pub fn verify(&self) -> bool {
        sea_crypto::verify(&self.owner, &self.signature, &self.signing_bytes())
    }
}
