//! In-memory ledger context.
//!
//! A `BTreeMap` behind a mutex, standing in for the validator's state
//! store. Tests and local tooling drive the full handler path against
//! it; the production transport lives outside this workspace.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::ports::{ContextError, LedgerContext};
use sea_state::Address;

/// Map-backed [`LedgerContext`].
#[derive(Debug, Default)]
pub struct MemoryLedgerContext {
    store: Mutex<BTreeMap<Address, Vec<u8>>>,
}

impl MemoryLedgerContext {
    /// Construct an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw read of one entry, bypassing the context protocol.
    pub fn entry(&self, address: &str) -> Option<Vec<u8>> {
        self.store
            .lock()
            .ok()
            .and_then(|store| store.get(address).cloned())
    }

    /// Number of entries stored.
    pub fn len(&self) -> usize {
        self.store.lock().map(|store| store.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerContext for MemoryLedgerContext {
    fn get_state(&self, addresses: &[Address]) -> Result<BTreeMap<Address, Vec<u8>>, ContextError> {
        let store = self
            .store
            .lock()
            .map_err(|_| ContextError::Request("state lock poisoned".to_string()))?;
        let mut results = BTreeMap::new();
        for address in addresses {
            if let Some(bytes) = store.get(address) {
                results.insert(address.clone(), bytes.clone());
            }
        }
        Ok(results)
    }

    fn set_state(&self, entries: &BTreeMap<Address, Vec<u8>>) -> Result<Vec<Address>, ContextError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| ContextError::Request("state lock poisoned".to_string()))?;
        let mut written = Vec::new();
        for (address, bytes) in entries {
            store.insert(address.clone(), bytes.clone());
            written.push(address.clone());
        }
        Ok(written)
    }
}
