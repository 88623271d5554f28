//! Engine error taxonomy.
//!
//! Authentication failures are deliberately flat: `InvalidCredentials`
//! carries no hint of which factor failed, so repeated probing learns
//! nothing. Cryptographic failures always surface as rejections; no path
//! returns default or partial plaintext.

use sealbox_blobstore::BlobError;
use sealbox_crypto::CryptoError;
use sealbox_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown user, wrong credential, or key material that does not match.
    /// Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// No registry row for this `(document, user)` pair.
    #[error("document {document_id} is not shared with user {user_id}")]
    AccessDenied {
        document_id: String,
        user_id: String,
    },

    /// The supplied private key failed to unwrap the registry row.
    #[error("invalid private key for user {0}")]
    InvalidKey(String),

    /// The owner's access cannot be revoked.
    #[error("cannot revoke the owner of document {0}")]
    CannotRevokeOwner(String),

    /// Stored ciphertext failed authentication on decrypt.
    #[error("content integrity check failed for document {0}")]
    CorruptContent(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("blob storage error: {0}")]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
