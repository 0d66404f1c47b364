//! # SHA-2 Hashing
//!
//! One-shot SHA-256/384/512 used for ledger addresses, file-key indices
//! and outbox deduplication. Hex-input variants exist because most of the
//! world state carries hashes and keys as hex strings.

use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::CryptoError;

/// SHA-256 digest (32 bytes).
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 digest as lowercase hex (64 chars).
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// SHA-384 digest (48 bytes).
pub fn sha384(data: &[u8]) -> [u8; 48] {
    let digest = Sha384::digest(data);
    let mut out = [0u8; 48];
    out.copy_from_slice(&digest);
    out
}

/// SHA-384 digest as lowercase hex (96 chars).
pub fn sha384_hex(data: &[u8]) -> String {
    hex::encode(sha384(data))
}

/// SHA-512 digest (64 bytes).
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let digest = Sha512::digest(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

/// SHA-512 digest as lowercase hex (128 chars).
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(sha512(data))
}

/// SHA-512 over the bytes behind a hex string, as hex.
///
/// File-key indices are computed this way: the key circulates as hex but
/// the index is the digest of the underlying bytes.
pub fn sha512_hex_from_hex(data: &str) -> Result<String, CryptoError> {
    Ok(sha512_hex(&crate::from_hex(data)?))
}
