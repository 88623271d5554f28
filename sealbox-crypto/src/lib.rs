//! Encryption layer for Sealbox.
//!
//! Provides the envelope-encryption primitives:
//! - AES-GCM authenticated encryption for document content
//! - RSA-2048 key pairs with OAEP key wrapping and PSS signatures
//! - Argon2id key derivation from user credentials
//! - Passphrase-protected private key custody
//!
//! # Architecture
//!
//! Content is encrypted once under a random per-document DEK (Data
//! Encryption Key). The DEK is then wrapped separately under each
//! recipient's RSA public key, so the storage tier only ever sees
//! ciphertext and wrapped keys. A user's private key is itself sealed
//! under a key derived from their credential and is decrypted on demand,
//! never persisted in plaintext.

pub mod cipher;
pub mod custody;
mod error;
pub mod kdf;
pub mod keys;

pub use cipher::{decrypt, encrypt, generate_key, NONCE_SIZE, TAG_SIZE, VALID_KEY_SIZES};
pub use custody::{
    generate_credential, protect_private_key, unlock_private_key, ProtectedPrivateKey,
};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{Argon2Kdf, DerivedKey, Kdf, KdfParams, Salt, KEY_SIZE, SALT_SIZE};
pub use keys::{
    generate_key_pair, private_key_from_pem, private_key_to_pem, public_key_from_pem,
    public_key_to_pem, sign, unwrap_key, verify, verify_key_pair, wrap_key, KeyPair, KEY_BITS,
};
