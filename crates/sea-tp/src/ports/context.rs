//! Ledger context and handler ports.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::errors::ApplyError;
use sea_state::Address;

/// Failures of the validator connection.
///
/// These always classify as internal errors: the transaction itself may
/// be fine and the runtime is free to retry it.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The validator endpoint could not be reached.
    #[error("Context connection failed: {0}")]
    Connection(String),

    /// A state request was sent but not answered successfully.
    #[error("Context request failed: {0}")]
    Request(String),
}

/// Access to the ledger's key-value state for one transaction.
///
/// Both calls are synchronous request/response against the validator;
/// they are the only suspension points in an `apply`. Addresses absent
/// from a `get_state` response are simply missing from the returned
/// map, and `set_state` returns the addresses actually written so the
/// caller can detect a short write.
pub trait LedgerContext {
    /// Read raw state entries.
    fn get_state(&self, addresses: &[Address]) -> Result<BTreeMap<Address, Vec<u8>>, ContextError>;

    /// Write raw state entries in one batch.
    fn set_state(&self, entries: &BTreeMap<Address, Vec<u8>>) -> Result<Vec<Address>, ContextError>;
}

/// One transaction as delivered by the runtime, header fields already
/// verified and flattened.
#[derive(Debug, Clone)]
pub struct TpProcessRequest {
    /// Transaction signature, used as its identifier.
    pub signature: String,
    /// Public key that signed the transaction.
    pub signer_public_key: String,
    /// The action payload.
    pub payload: Vec<u8>,
}

/// A transaction family implementation the runtime can register.
pub trait TransactionHandler {
    /// Family name announced to the validator.
    fn family_name(&self) -> String;

    /// Family versions this handler accepts.
    fn family_versions(&self) -> Vec<String>;

    /// Namespace prefixes this handler owns.
    fn namespaces(&self) -> Vec<String>;

    /// Validate and apply one transaction against the ledger state.
    fn apply(
        &self,
        request: &TpProcessRequest,
        context: &dyn LedgerContext,
    ) -> Result<(), ApplyError>;
}
