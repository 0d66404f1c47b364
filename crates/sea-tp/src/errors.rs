//! Processor error types.
//!
//! The ledger runtime distinguishes exactly two failure classes: an
//! invalid transaction is rejected and never retried, an internal error
//! leaves the transaction eligible for retry once the infrastructure
//! recovers. Everything the domain or the context reports is folded
//! into one of the two here.

use thiserror::Error;

use crate::ports::ContextError;
use sea_state::StateError;

/// Outcome classification for a failed `apply`.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The transaction is malformed or violates a precondition; it is
    /// rejected and state is unchanged.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Infrastructure failure; the runtime may retry the transaction
    /// later. State is unchanged.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplyError {
    /// Shorthand for an invalid-transaction error.
    pub fn invalid(message: impl Into<String>) -> Self {
        ApplyError::InvalidTransaction(message.into())
    }

    /// Shorthand for an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApplyError::InternalError(message.into())
    }
}

impl From<StateError> for ApplyError {
    fn from(e: StateError) -> Self {
        match e {
            // a state record that fails to encode or decode is
            // infrastructure corruption, not a bad transaction
            StateError::Serialization(msg) => ApplyError::InternalError(msg),
            other => ApplyError::InvalidTransaction(other.to_string()),
        }
    }
}

impl From<ContextError> for ApplyError {
    fn from(e: ContextError) -> Self {
        ApplyError::InternalError(e.to_string())
    }
}
