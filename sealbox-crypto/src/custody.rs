//! Passphrase custody of private keys.
//!
//! A user's private key is sealed under a key derived from their credential
//! and stored only in that form. The credential is a generated multi-word
//! passphrase, shown exactly once at creation; there is no recovery path.

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{Kdf, Salt, SALT_SIZE};
use crate::{cipher, keys};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::RsaPrivateKey;

/// A private key sealed under a credential-derived key.
///
/// The salt travels with the ciphertext so the credential is the only input
/// needed to unlock. Byte layout: `salt(16) || nonce(16) || tag(16) || ciphertext`.
#[derive(Clone, Debug)]
pub struct ProtectedPrivateKey {
    pub salt: Salt,
    pub sealed: Vec<u8>,
}

impl ProtectedPrivateKey {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_SIZE + self.sealed.len());
        out.extend_from_slice(self.salt.as_bytes());
        out.extend_from_slice(&self.sealed);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < SALT_SIZE + cipher::NONCE_SIZE + cipher::TAG_SIZE {
            return Err(CryptoError::Decryption(
                "protected key blob too short".to_string(),
            ));
        }
        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&bytes[..SALT_SIZE]);
        Ok(Self {
            salt: Salt::from_bytes(salt),
            sealed: bytes[SALT_SIZE..].to_vec(),
        })
    }
}

/// Generates a high-entropy passphrase: 12 BIP39 words joined with hyphens
/// (128 bits of entropy).
pub fn generate_credential() -> CryptoResult<String> {
    let mut entropy = [0u8; 16];
    OsRng.fill_bytes(&mut entropy);

    let mnemonic = bip39::Mnemonic::from_entropy(&entropy)
        .map_err(|e| CryptoError::KeyGeneration(format!("passphrase generation failed: {e}")))?;
    let phrase = mnemonic.to_string();
    let words: Vec<&str> = phrase.split_whitespace().collect();
    Ok(words.join("-"))
}

/// Seals a private key under a credential.
pub fn protect_private_key(
    private: &RsaPrivateKey,
    credential: &str,
    kdf: &dyn Kdf,
) -> CryptoResult<ProtectedPrivateKey> {
    let salt = Salt::random();
    let key = kdf.derive(credential, &salt)?;
    let pem = keys::private_key_to_pem(private)?;
    let sealed = cipher::encrypt(key.as_bytes(), pem.as_bytes())?;
    Ok(ProtectedPrivateKey { salt, sealed })
}

/// Unlocks a sealed private key.
///
/// Any failure (wrong credential, tampered blob, malformed key text) fails
/// closed; callers treat all of them as an invalid credential.
pub fn unlock_private_key(
    protected: &ProtectedPrivateKey,
    credential: &str,
    kdf: &dyn Kdf,
) -> CryptoResult<RsaPrivateKey> {
    let key = kdf.derive(credential, &protected.salt)?;
    let pem_bytes = cipher::decrypt(key.as_bytes(), &protected.sealed)?;
    let pem = String::from_utf8(pem_bytes)
        .map_err(|_| CryptoError::Decryption("unsealed key is not valid text".to_string()))?;
    keys::private_key_from_pem(&pem)
}
