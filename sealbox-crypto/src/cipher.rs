//! Authenticated symmetric encryption for document content.
//!
//! AES-GCM with a random 16-byte nonce per call. The output layout is
//! `nonce(16) || tag(16) || ciphertext` and is part of the storage
//! contract: blobs written under one version must decrypt under the next.

use crate::error::{CryptoError, CryptoResult};
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, Nonce};
use aes_gcm::aes::{Aes128, Aes192, Aes256};
use aes_gcm::{AesGcm, KeyInit};
use rand::rngs::OsRng;
use rand::RngCore;

/// Nonce length in bytes.
pub const NONCE_SIZE: usize = 16;
/// GCM authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;
/// Accepted AES key lengths (AES-128/192/256).
pub const VALID_KEY_SIZES: [usize; 3] = [16, 24, 32];

/// Encrypts `plaintext` under `key`, producing `nonce || tag || ciphertext`.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    match key.len() {
        16 => seal::<AesGcm<Aes128, U16>>(key, plaintext),
        24 => seal::<AesGcm<Aes192, U16>>(key, plaintext),
        32 => seal::<AesGcm<Aes256, U16>>(key, plaintext),
        actual => Err(CryptoError::InvalidKeyLength { actual }),
    }
}

/// Decrypts a `nonce || tag || ciphertext` blob produced by [`encrypt`].
///
/// Fails closed on tag mismatch: no partial plaintext is ever returned.
pub fn decrypt(key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>> {
    match key.len() {
        16 => open::<AesGcm<Aes128, U16>>(key, data),
        24 => open::<AesGcm<Aes192, U16>>(key, data),
        32 => open::<AesGcm<Aes256, U16>>(key, data),
        actual => Err(CryptoError::InvalidKeyLength { actual }),
    }
}

/// Generates a random key of a valid AES length.
pub fn generate_key(size: usize) -> CryptoResult<Vec<u8>> {
    if !VALID_KEY_SIZES.contains(&size) {
        return Err(CryptoError::InvalidKeyLength { actual: size });
    }
    let mut key = vec![0u8; size];
    OsRng.fill_bytes(&mut key);
    Ok(key)
}

fn seal<C>(key: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: KeyInit + Aead,
{
    let cipher =
        C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })?;

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    // The AEAD API appends the tag to the ciphertext; the stored layout
    // carries it up front, right after the nonce.
    let sealed = cipher
        .encrypt(Nonce::<C>::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let tag_start = sealed.len() - TAG_SIZE;

    let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed[tag_start..]);
    out.extend_from_slice(&sealed[..tag_start]);
    Ok(out)
}

fn open<C>(key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: KeyInit + Aead,
{
    if data.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Decryption(
            "input shorter than nonce and tag".to_string(),
        ));
    }
    let cipher =
        C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })?;

    let (nonce, rest) = data.split_at(NONCE_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let mut sealed = Vec::with_capacity(rest.len());
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), sealed.as_slice())
        .map_err(|_| {
            CryptoError::Decryption("authentication failed (wrong key or tampered data)".to_string())
        })
}
