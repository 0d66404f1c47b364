//! # Sea Crypto - Primitives for the SeaStorage Transaction Processor
//!
//! Every primitive here is deterministic: the same input bytes always
//! produce the same output bytes, which is what lets the ledger replay
//! transactions on any node and arrive at identical state.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256/384/512 | Addresses, key indices, outbox dedup |
//! | `ecdsa` | secp256k1 | Proof-of-custody signatures |
//! | `ecies` | secp256k1 + AES-GCM | Key publication checks |
//! | `symmetric` | AES-GCM | File-key material |
//!
//! Keys, hashes and ciphertexts cross module boundaries as lowercase hex
//! strings, matching the ledger's address and payload encoding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod ecies;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use ecdsa::{sign, verify};
pub use ecies::{decrypt, encrypt, verify_key_publication};
pub use errors::CryptoError;
pub use hashing::{
    sha256, sha256_hex, sha384, sha384_hex, sha512, sha512_hex, sha512_hex_from_hex,
};
pub use symmetric::{aes_decrypt, aes_encrypt, generate_aes_key};

/// Decode a hex string, mapping failures onto [`CryptoError`].
pub fn from_hex(data: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(data).map_err(|_| CryptoError::InvalidHex(data.to_string()))
}

/// Encode bytes as lowercase hex.
pub fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
