//! # Symmetric Encryption (AES-GCM)
//!
//! File keys are AES keys generated client-side; the processor only ever
//! re-encrypts key material during publication checks, but the full
//! symmetric surface lives here so client tooling and tests share one
//! implementation.
//!
//! Encryption is deterministic: the nonce is derived from the plaintext
//! digest and prepended to the output, so equal (key, plaintext) pairs
//! give equal bytes.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use rand::RngCore;

use crate::CryptoError;

type Aes192Gcm = AesGcm<Aes192, U12>;

const NONCE_LEN: usize = 12;
const KEY_BITS: &[usize] = &[128, 192, 256];

fn plaintext_nonce(plaintext: &[u8]) -> [u8; NONCE_LEN] {
    let digest = crate::sha256(plaintext);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&digest[..NONCE_LEN]);
    nonce
}

/// Encrypt with a hex-encoded AES key of 128, 192 or 256 bits.
///
/// Output is `nonce (12 bytes) || ciphertext`.
pub fn aes_encrypt(key: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let key_bytes = crate::from_hex(key)?;
    let nonce = plaintext_nonce(plaintext);
    let sealed = match key_bytes.len() {
        16 => Aes128Gcm::new_from_slice(&key_bytes)
            .expect("length checked")
            .encrypt(Nonce::from_slice(&nonce), plaintext),
        24 => Aes192Gcm::new_from_slice(&key_bytes)
            .expect("length checked")
            .encrypt(Nonce::from_slice(&nonce), plaintext),
        32 => Aes256Gcm::new_from_slice(&key_bytes)
            .expect("length checked")
            .encrypt(Nonce::from_slice(&nonce), plaintext),
        n => {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_BITS,
                actual: n * 8,
            })
        }
    };
    let sealed = sealed.map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let mut out = nonce.to_vec();
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt data produced by [`aes_encrypt`].
pub fn aes_decrypt(key: &str, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() <= NONCE_LEN {
        return Err(CryptoError::MalformedCiphertext);
    }
    let key_bytes = crate::from_hex(key)?;
    let (nonce, sealed) = data.split_at(NONCE_LEN);
    let opened = match key_bytes.len() {
        16 => Aes128Gcm::new_from_slice(&key_bytes)
            .expect("length checked")
            .decrypt(Nonce::from_slice(nonce), sealed),
        24 => Aes192Gcm::new_from_slice(&key_bytes)
            .expect("length checked")
            .decrypt(Nonce::from_slice(nonce), sealed),
        32 => Aes256Gcm::new_from_slice(&key_bytes)
            .expect("length checked")
            .decrypt(Nonce::from_slice(nonce), sealed),
        n => {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_BITS,
                actual: n * 8,
            })
        }
    };
    opened.map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Generate a random AES key of 128, 192 or 256 bits, as hex.
pub fn generate_aes_key(bits: usize) -> Result<String, CryptoError> {
    if !KEY_BITS.contains(&bits) {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_BITS,
            actual: bits,
        });
    }
    let mut key = vec![0u8; bits / 8];
    rand::thread_rng().fill_bytes(&mut key);
    Ok(hex::encode(key))
}
