//! # Deterministic ECIES (secp256k1 + AES-256-GCM)
//!
//! Public-key encryption used by the key-publication flow: an owner
//! proves knowledge of a file key by re-encrypting it under their own
//! public key and matching the stored ciphertext byte-for-byte.
//!
//! That comparison only works if encryption is a pure function, so the
//! ephemeral scalar is not random: it is derived from
//! SHA-512(plaintext || recipient public key). Equal inputs therefore
//! produce equal ciphertexts. Confidentiality against parties who do not
//! already know the plaintext is preserved; anyone holding the plaintext
//! can recompute the ciphertext, which is exactly the property the
//! verification check relies on.
//!
//! Wire form: `ephemeral point (33 bytes, SEC1 compressed) || AES-GCM
//! ciphertext`. The AES nonce is fixed to zero because every derived key
//! encrypts exactly one message.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{NonZeroScalar, ProjectivePoint, PublicKey, SecretKey};
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroize;

use crate::CryptoError;

const EPHEMERAL_LEN: usize = 33;

/// Derive a non-zero scalar from seed material.
///
/// Hashes the seed with an incrementing suffix until the digest is a
/// valid scalar; the loop terminates on the first try for all practical
/// inputs and is fully deterministic.
fn derive_scalar(seed: &[u8]) -> NonZeroScalar {
    let mut counter: u8 = 0;
    loop {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update([counter]);
        let digest = hasher.finalize();
        let candidate: Option<NonZeroScalar> = NonZeroScalar::from_repr(digest).into();
        if let Some(scalar) = candidate {
            return scalar;
        }
        counter = counter.wrapping_add(1);
    }
}

/// AES key for a shared curve point.
fn symmetric_key(shared: &ProjectivePoint) -> [u8; 32] {
    crate::sha256(shared.to_affine().to_encoded_point(true).as_bytes())
}

/// Encrypt plaintext for a hex-encoded secp256k1 public key.
pub fn encrypt(public_key: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let recipient_bytes = crate::from_hex(public_key)?;
    let recipient = PublicKey::from_sec1_bytes(&recipient_bytes)
        .map_err(|_| CryptoError::InvalidPublicKey)?;

    let mut seed = Sha512::new();
    seed.update(plaintext);
    seed.update(&recipient_bytes);
    let ephemeral = derive_scalar(&seed.finalize());

    let ephemeral_point = (ProjectivePoint::GENERATOR * *ephemeral).to_affine();
    let shared = recipient.to_projective() * *ephemeral;
    let mut key = symmetric_key(&shared);

    let cipher = Aes256Gcm::new((&key).into());
    let sealed = cipher
        .encrypt(Nonce::from_slice(&[0u8; 12]), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    key.zeroize();

    let mut out = ephemeral_point.to_encoded_point(true).as_bytes().to_vec();
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt a ciphertext produced by [`encrypt`] with a hex private key.
pub fn decrypt(private_key: &str, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() <= EPHEMERAL_LEN {
        return Err(CryptoError::MalformedCiphertext);
    }
    let key_bytes = crate::from_hex(private_key)?;
    let secret =
        SecretKey::from_slice(&key_bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let ephemeral = PublicKey::from_sec1_bytes(&data[..EPHEMERAL_LEN])
        .map_err(|_| CryptoError::MalformedCiphertext)?;

    let shared = ephemeral.to_projective() * *secret.to_nonzero_scalar();
    let mut key = symmetric_key(&shared);

    let cipher = Aes256Gcm::new((&key).into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&[0u8; 12]), &data[EPHEMERAL_LEN..])
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()));
    key.zeroize();
    plaintext
}

/// Check that `key` re-encrypts under `public_key` to `stored_cipher`.
///
/// This is the predicate behind key publication: only someone who knows
/// the plaintext key can reproduce the ciphertext recorded at upload
/// time. Malformed inputs simply fail the check.
pub fn verify_key_publication(public_key: &str, key: &str, stored_cipher: &str) -> bool {
    let Ok(key_bytes) = crate::from_hex(key) else {
        return false;
    };
    let Ok(expected) = crate::from_hex(stored_cipher) else {
        return false;
    };
    match encrypt(public_key, &key_bytes) {
        Ok(cipher) => cipher == expected,
        Err(_) => false,
    }
}
