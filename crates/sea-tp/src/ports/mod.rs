//! Interfaces between the processor and the ledger runtime.
//!
//! The runtime side (transaction streaming, signature checking, block
//! ordering) is an external component; these traits are the whole
//! surface the processor needs from it.

pub mod context;

pub use context::{ContextError, LedgerContext, TpProcessRequest, TransactionHandler};
