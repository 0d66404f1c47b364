//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
///
/// The primitives have no failure modes beyond malformed input, so every
/// variant names the input that could not be used.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Input is not valid hex
    #[error("Invalid hex input: {0}")]
    InvalidHex(String),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignature,

    /// Invalid key length
    #[error("Invalid key length: expected one of {expected:?} bits, got {actual}")]
    InvalidKeyLength {
        /// Accepted key lengths in bits
        expected: &'static [usize],
        /// Actual key length in bits
        actual: usize,
    },

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Ciphertext too short or structurally invalid
    #[error("Malformed ciphertext")]
    MalformedCiphertext,
}
