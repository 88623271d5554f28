//! Identity and credential custody.
//!
//! Creates per-user key material and unlocks it on demand. The credential
//! returned by `create_user` is the only secret that ever opens the private
//! key; it is shown once and cannot be recovered.

use crate::error::{EngineError, EngineResult};
use chrono::Utc;
use rsa::RsaPrivateKey;
use sealbox_crypto::{custody, keys, Argon2Kdf, Kdf, ProtectedPrivateKey};
use sealbox_store::UserStore;
use sealbox_types::User;
use std::sync::Arc;
use tracing::info;

/// Input for account provisioning.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Result of account provisioning. `credential` appears here and nowhere
/// else; it is not persisted in any form.
pub struct CreatedUser {
    pub user: User,
    pub credential: String,
}

/// A user whose private key has been unlocked for the current call chain.
pub struct AuthenticatedUser {
    pub user: User,
    pub private_key: RsaPrivateKey,
}

/// Per-user key-pair lifecycle and credential verification.
pub struct IdentityService {
    users: UserStore,
    kdf: Arc<dyn Kdf>,
}

impl IdentityService {
    /// Builds the service with the default Argon2id credential KDF.
    pub fn new(users: UserStore) -> Self {
        Self::with_kdf(users, Arc::new(Argon2Kdf::default()))
    }

    /// Builds the service with an explicit KDF strategy.
    pub fn with_kdf(users: UserStore, kdf: Arc<dyn Kdf>) -> Self {
        Self { users, kdf }
    }

    /// Provisions a user: fresh key pair, fresh credential, private key
    /// sealed under the credential.
    pub fn create_user(&self, new: NewUser) -> EngineResult<CreatedUser> {
        let pair = keys::generate_key_pair()?;
        let credential = custody::generate_credential()?;
        let protected = custody::protect_private_key(&pair.private, &credential, self.kdf.as_ref())?;

        let user = User {
            id: new.id,
            name: new.name,
            email: new.email,
            public_key: keys::public_key_to_pem(&pair.public)?,
            encrypted_private_key: protected.to_bytes(),
            created_at: Utc::now(),
        };
        self.users.insert(&user)?;
        info!("created identity for user {}", user.id);

        Ok(CreatedUser { user, credential })
    }

    /// Unlocks a user's private key with their credential.
    ///
    /// Wrong credential, tampered key material, and a key that does not
    /// match the stored public half all collapse into `InvalidCredentials`.
    pub fn unlock(&self, user: &User, credential: &str) -> EngineResult<RsaPrivateKey> {
        let protected = ProtectedPrivateKey::from_bytes(&user.encrypted_private_key)
            .map_err(|_| EngineError::InvalidCredentials)?;
        let private = custody::unlock_private_key(&protected, credential, self.kdf.as_ref())
            .map_err(|_| EngineError::InvalidCredentials)?;

        let public = keys::public_key_from_pem(&user.public_key)
            .map_err(|_| EngineError::InvalidCredentials)?;
        if !keys::verify_key_pair(&private, &public) {
            return Err(EngineError::InvalidCredentials);
        }
        Ok(private)
    }

    /// Authenticates a user by id and credential, returning their unlocked
    /// private key. This is the bridge consumed by network-facing auth.
    pub fn authenticate(&self, user_id: &str, credential: &str) -> EngineResult<AuthenticatedUser> {
        let user = self
            .users
            .get(user_id)?
            .ok_or(EngineError::InvalidCredentials)?;
        let private_key = self.unlock(&user, credential)?;
        Ok(AuthenticatedUser { user, private_key })
    }

    /// Side-effect-free credential check; false on any failure.
    pub fn verify_credential(&self, user_id: &str, credential: &str) -> bool {
        self.authenticate(user_id, credential).is_ok()
    }

    /// Removes a user and cascades their registry rows.
    pub fn delete_user(&self, user_id: &str) -> EngineResult<()> {
        self.users.delete_cascade(user_id).map_err(|e| match e {
            sealbox_store::StoreError::NotFound(_) => EngineError::UserNotFound(user_id.to_string()),
            other => other.into(),
        })?;
        info!("deleted user {user_id}");
        Ok(())
    }
}
