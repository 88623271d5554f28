//! Persistent row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user and their key material.
///
/// The plaintext private key never persists: `encrypted_private_key` is the
/// PKCS#8 PEM sealed under a key derived from the user's credential
/// (see `sealbox-crypto`'s custody module for the byte layout). The
/// credential itself is returned once at creation and never stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// SPKI PEM encoding of the user's RSA public key.
    pub public_key: String,
    /// `salt(16) || nonce(16) || tag(16) || ciphertext` over the private key PEM.
    pub encrypted_private_key: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// An uploaded document.
///
/// `id` is derived from `(owner_id, filepath, content_hash)`, so re-uploading
/// identical content at the same path resolves to the same row. Only
/// AES-GCM ciphertext is stored in the byte store, keyed by `id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filepath: String,
    pub owner_id: String,
    /// Hex SHA-256 of the plaintext content.
    pub content_hash: String,
    pub uploaded_on: DateTime<Utc>,
}

/// An access-registry row: user `user_id` holds document `document_id`'s DEK,
/// wrapped under that user's public key.
///
/// Composite primary key `(document_id, user_id)`; the set of rows for a
/// document is exactly its access list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SharedKey {
    pub document_id: String,
    pub user_id: String,
    /// RSA-OAEP ciphertext of the document's DEK.
    pub wrapped_key: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
