//! # Sea Outbox
//!
//! A sea is a storage provider. Tree mutations that create provider work
//! (freeing deleted fragments, marking shared ones retrievable) land in
//! the sea's outbox as pending operations, keyed by the SHA-256 of their
//! canonical bytes so identical pending work collapses to one entry.
//! Providers poll the outbox off-chain and confirm completed operations
//! in a later transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{codec, Hash, StateError};

/// What a pending operation asks the provider to do, and on whose
/// behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeaAction {
    /// Free fragment bytes deleted from a user tree.
    UserDelete,
    /// Treat fragment bytes shared from a user tree as retrievable.
    UserShared,
    /// Free fragment bytes deleted from a group tree.
    GroupDelete,
    /// Treat fragment bytes shared from a group tree as retrievable.
    GroupShared,
}

impl SeaAction {
    /// Delete action for a user or group tree.
    pub fn delete(group: bool) -> Self {
        if group {
            SeaAction::GroupDelete
        } else {
            SeaAction::UserDelete
        }
    }

    /// Share action for a user or group tree.
    pub fn shared(group: bool) -> Self {
        if group {
            SeaAction::GroupShared
        } else {
            SeaAction::UserShared
        }
    }
}

/// One unit of pending provider work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeaOperation {
    /// What to do.
    pub action: SeaAction,
    /// Public key of the owner whose mutation produced the work.
    pub owner: Hash,
    /// Hash of the affected fragment.
    pub hash: Hash,
    /// Whether the fragment lived in a shared tree.
    pub shared: bool,
}

impl SeaOperation {
    /// Construct an operation.
    pub fn new(action: SeaAction, owner: &str, hash: &str, shared: bool) -> Self {
        Self {
            action,
            owner: owner.to_string(),
            hash: hash.to_string(),
            shared,
        }
    }

    /// SHA-256 of the canonical bytes; equal operations hash equally on
    /// every node.
    pub fn operation_hash(&self) -> Result<Hash, StateError> {
        Ok(sea_crypto::sha256_hex(&codec::to_bytes(self)?))
    }
}

/// A storage provider and its pending work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sea {
    /// The provider's public key.
    pub public_key: Hash,
    /// Number of fragment bindings this sea holds across all roots.
    pub handles: i32,
    /// Pending operations by canonical hash.
    pub operations: BTreeMap<Hash, SeaOperation>,
}

impl Sea {
    /// Construct a provider with an empty outbox.
    pub fn new(public_key: &str) -> Self {
        Self {
            public_key: public_key.to_string(),
            handles: 0,
            operations: BTreeMap::new(),
        }
    }

    /// Add pending operations; duplicates collapse onto one entry.
    pub fn add_operations(&mut self, operations: Vec<SeaOperation>) -> Result<(), StateError> {
        for operation in operations {
            let hash = operation.operation_hash()?;
            self.operations.insert(hash, operation);
        }
        Ok(())
    }

    /// Remove confirmed operations by their canonical hash. Unknown
    /// operations are ignored.
    pub fn confirm_operations(&mut self, operations: &[SeaOperation]) -> Result<(), StateError> {
        for operation in operations {
            self.operations.remove(&operation.operation_hash()?);
        }
        Ok(())
    }
}
