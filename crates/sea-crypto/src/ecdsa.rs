//! # ECDSA Signatures (secp256k1)
//!
//! Signing and verification for proof-of-custody operations. Keys and
//! signatures travel as hex strings: private keys are 32 bytes, public
//! keys are SEC1 points (compressed or uncompressed), signatures are the
//! 64-byte `r || s` form.
//!
//! Signing uses RFC 6979 deterministic nonces, so equal (key, message)
//! pairs always yield equal signatures.

use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};

use crate::CryptoError;

/// Sign a message with a hex-encoded secp256k1 private key.
///
/// Returns the signature as 128 hex chars (64 bytes, `r || s`).
pub fn sign(private_key: &str, message: &[u8]) -> Result<String, CryptoError> {
    let key_bytes = crate::from_hex(private_key)?;
    let signing_key =
        SigningKey::from_slice(&key_bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let signature: Signature = signing_key.sign(message);
    Ok(hex::encode(signature.to_bytes()))
}

/// Verify a hex signature over a message against a hex public key.
///
/// Malformed keys or signatures verify as `false`; a signature check has
/// no error channel distinct from "not valid".
pub fn verify(public_key: &str, signature: &str, message: &[u8]) -> bool {
    let Ok(key_bytes) = crate::from_hex(public_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = crate::from_hex(signature) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(&sig_bytes) else {
        return false;
    };
    verifying_key.verify(message, &sig).is_ok()
}

/// Derive the compressed hex public key for a hex private key.
///
/// Used by tests and tooling; the processor itself only ever verifies.
pub fn public_key_hex(private_key: &str) -> Result<String, CryptoError> {
    let key_bytes = crate::from_hex(private_key)?;
    let signing_key =
        SigningKey::from_slice(&key_bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let verifying_key = signing_key.verifying_key();
    Ok(hex::encode(verifying_key.to_sec1_bytes()))
}
