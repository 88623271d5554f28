//! Key derivation from user credentials.
//!
//! Credentials are never used as cipher keys directly: they pass through a
//! slow, salted KDF first. The strategy is pluggable so tests can run with
//! cheaper parameters; Argon2id is the default.

use crate::error::{CryptoError, CryptoResult};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Derived key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;
/// Salt length in bytes.
pub const SALT_SIZE: usize = 16;

/// Random per-protection salt, stored alongside the ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// A credential-derived symmetric key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Pluggable credential-to-key derivation strategy.
pub trait Kdf: Send + Sync {
    fn derive(&self, secret: &str, salt: &Salt) -> CryptoResult<DerivedKey>;
}

/// Argon2id derivation with configurable cost.
pub struct Argon2Kdf {
    params: KdfParams,
}

impl Argon2Kdf {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }
}

impl Default for Argon2Kdf {
    fn default() -> Self {
        Self::new(KdfParams::default())
    }
}

impl Kdf for Argon2Kdf {
    fn derive(&self, secret: &str, salt: &Salt) -> CryptoResult<DerivedKey> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = [0u8; KEY_SIZE];
        argon2
            .hash_password_into(secret.as_bytes(), salt.as_bytes(), &mut out)
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        Ok(DerivedKey(out))
    }
}
