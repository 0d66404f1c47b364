//! Concrete implementations of the ledger-side ports.

pub mod memory;

pub use memory::MemoryLedgerContext;
