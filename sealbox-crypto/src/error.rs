//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
///
/// Decryption failures are deliberately coarse: a wrong key and tampered
/// data are indistinguishable to callers.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key must be 16, 24, or 32 bytes, got {actual}")]
    InvalidKeyLength { actual: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("key serialization failed: {0}")]
    KeyFormat(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("signing failed: {0}")]
    Signing(String),
}
