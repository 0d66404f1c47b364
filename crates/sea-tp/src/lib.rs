//! # Sea TP - The SeaStorage Transaction Processor
//!
//! The layer between the ledger runtime and the world state. The ledger
//! delivers signed transactions; this crate decodes the action payload,
//! loads the addressed entities through per-transaction caches, invokes
//! the domain, and writes every mutated entity back in one batched
//! `set_state`. Either the whole batch commits or nothing does.
//!
//! ## Modules
//!
//! - `address`: the namespace and address construction contract
//! - `payload`: the canonical action payload and its sparse action table
//! - `state`: cached read-through/write-through state facade
//! - `handler`: action dispatch implementing [`ports::TransactionHandler`]
//! - `ports`: ledger-context and handler interfaces (the SDK transport
//!   behind them is an external component)
//! - `adapters`: an in-memory ledger context for tests and tooling

#![warn(clippy::all)]

pub mod adapters;
pub mod address;
pub mod errors;
pub mod handler;
pub mod payload;
pub mod ports;
pub mod state;

pub use errors::ApplyError;
pub use handler::SeaStorageHandler;
pub use payload::{Action, SeaStoragePayload};
pub use ports::{LedgerContext, TpProcessRequest, TransactionHandler};
pub use state::SeaStorageState;
