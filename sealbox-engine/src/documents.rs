//! Document envelope management.
//!
//! Each document's content is encrypted once under a random DEK; the DEK is
//! wrapped per recipient into the access registry. Share and revoke are
//! authorized by unwrapping the owner's own registry row with the supplied
//! private key: a wrong or non-owner key cannot recover the DEK, so the
//! operation is rejected before anything mutates.
//!
//! Revocation removes the grant but does not rotate the DEK: plaintext or
//! keys extracted before revocation remain valid knowledge outside the
//! system. Forward secrecy on revoke would need DEK rotation plus content
//! re-encryption and is intentionally not provided.

use crate::error::{EngineError, EngineResult};
use chrono::Utc;
use rsa::RsaPrivateKey;
use sealbox_blobstore::{BlobError, ByteStore};
use sealbox_crypto::{cipher, keys};
use sealbox_store::{AccessRegistry, DocumentStore, UserStore};
use sealbox_types::{content_hash, document_id, Document, SharedKey, User};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// DEK length in bytes (AES-256).
const DEK_SIZE: usize = 32;

/// Result of an upload. For a repeated upload of identical content the
/// existing document comes back with `newly_created: false`.
#[derive(Clone, Debug)]
pub struct UploadOutcome {
    pub document: Document,
    pub shared_with: Vec<String>,
    pub newly_created: bool,
}

/// Result of a share: which of the requested ids gained access now versus
/// which already had it.
#[derive(Clone, Debug)]
pub struct ShareOutcome {
    pub newly_shared: Vec<String>,
    pub already_shared: Vec<String>,
}

/// Decrypted document content plus metadata.
#[derive(Clone, Debug)]
pub struct DownloadedDocument {
    pub filepath: String,
    pub owner_id: String,
    pub content: Vec<u8>,
}

/// Orchestrates the document lifecycle: nonexistent -> active -> deleted.
pub struct DocumentService {
    users: UserStore,
    documents: DocumentStore,
    registry: AccessRegistry,
    blobs: Arc<dyn ByteStore>,
}

impl DocumentService {
    pub fn new(
        users: UserStore,
        documents: DocumentStore,
        registry: AccessRegistry,
        blobs: Arc<dyn ByteStore>,
    ) -> Self {
        Self {
            users,
            documents,
            registry,
            blobs,
        }
    }

    /// Encrypts and stores a document, wrapping its DEK for the owner and
    /// every recipient.
    ///
    /// The document id is derived from `(owner, filepath, content)`, so an
    /// identical re-upload returns the existing document's sharing state
    /// without re-encrypting. Unknown recipient ids abort the whole upload
    /// before anything persists.
    pub fn upload(
        &self,
        owner_id: &str,
        filepath: &str,
        content: &[u8],
        recipient_ids: &[String],
    ) -> EngineResult<UploadOutcome> {
        if self.users.get(owner_id)?.is_none() {
            return Err(EngineError::UserNotFound(owner_id.to_string()));
        }

        let hash = content_hash(content);
        let id = document_id(owner_id, filepath, &hash);
        if let Some(existing) = self.documents.get(&id)? {
            debug!("upload of document {id} matched existing content");
            return self.existing_outcome(existing);
        }

        let mut member_ids: Vec<String> = vec![owner_id.to_string()];
        for recipient in recipient_ids {
            if !member_ids.contains(recipient) {
                member_ids.push(recipient.clone());
            }
        }
        let members = self.resolve_users(&member_ids)?;

        let dek = cipher::generate_key(DEK_SIZE)?;
        let sealed = cipher::encrypt(&dek, content)?;
        let document = Document {
            id: id.clone(),
            filepath: filepath.to_string(),
            owner_id: owner_id.to_string(),
            content_hash: hash,
            uploaded_on: Utc::now(),
        };
        let shares = self.wrap_for(&id, &dek, &members)?;

        if !self.documents.insert_with_shares(&document, &shares)? {
            // A concurrent upload of the same content won the primary key;
            // adopt its state rather than erroring.
            let existing = self
                .documents
                .get(&id)?
                .ok_or_else(|| EngineError::DocumentNotFound(id.clone()))?;
            return self.existing_outcome(existing);
        }

        if let Err(e) = self.blobs.write(&id, &sealed) {
            warn!("content write failed for document {id}, rolling back rows: {e}");
            if let Err(cleanup) = self.documents.delete_cascade(&id) {
                warn!("row rollback for document {id} failed: {cleanup}");
            }
            return Err(e.into());
        }

        info!(
            "uploaded document {id} for owner {owner_id}, {} key rows",
            shares.len()
        );
        let shared_with = self.registry.list_for_document(&id)?;
        Ok(UploadOutcome {
            document,
            shared_with,
            newly_created: true,
        })
    }

    /// Grants access to additional users.
    ///
    /// Requested ids are wrapped and upserted in one transaction; ids that
    /// already held access get a fresh wrap of the same DEK (last writer
    /// wins, semantically identical).
    pub fn share(
        &self,
        document_id: &str,
        recipient_ids: &[String],
        owner_private_key: &RsaPrivateKey,
    ) -> EngineResult<ShareOutcome> {
        let document = self.get(document_id)?;
        let dek = self.unwrap_owner_dek(&document, owner_private_key)?;

        let existing: BTreeSet<String> = self
            .registry
            .list_for_document(&document.id)?
            .into_iter()
            .collect();

        let mut requested: Vec<String> = Vec::new();
        for recipient in recipient_ids {
            if !requested.contains(recipient) {
                requested.push(recipient.clone());
            }
        }
        let members = self.resolve_users(&requested)?;
        let shares = self.wrap_for(&document.id, &dek, &members)?;
        self.registry.upsert_many(&shares)?;

        let (already_shared, newly_shared): (Vec<String>, Vec<String>) = requested
            .into_iter()
            .partition(|id| existing.contains(id));
        info!(
            "shared document {} with {} new users",
            document.id,
            newly_shared.len()
        );
        Ok(ShareOutcome {
            newly_shared,
            already_shared,
        })
    }

    /// Removes grants for the given users, returning the remaining access
    /// list.
    ///
    /// The owner's grant is permanent: naming the owner fails the whole call
    /// and leaves the registry untouched.
    pub fn revoke(
        &self,
        document_id: &str,
        revoke_ids: &[String],
        owner_private_key: &RsaPrivateKey,
    ) -> EngineResult<Vec<String>> {
        let document = self.get(document_id)?;
        self.unwrap_owner_dek(&document, owner_private_key)?;

        if revoke_ids.iter().any(|id| *id == document.owner_id) {
            return Err(EngineError::CannotRevokeOwner(document.id));
        }

        let removed = self.registry.delete_many(&document.id, revoke_ids)?;
        info!("revoked {removed} grants on document {}", document.id);
        self.access_list(&document.id)
    }

    /// Decrypts a document for a user holding a wrapped key.
    pub fn download(
        &self,
        document_id: &str,
        requester_id: &str,
        requester_private_key: &RsaPrivateKey,
    ) -> EngineResult<DownloadedDocument> {
        let document = self.get(document_id)?;
        let row = self
            .registry
            .get(&document.id, requester_id)?
            .ok_or_else(|| EngineError::AccessDenied {
                document_id: document.id.clone(),
                user_id: requester_id.to_string(),
            })?;

        let dek = keys::unwrap_key(&row.wrapped_key, requester_private_key)
            .map_err(|_| EngineError::InvalidKey(requester_id.to_string()))?;
        let sealed = self.blobs.read(&document.id)?;
        let content = cipher::decrypt(&dek, &sealed)
            .map_err(|_| EngineError::CorruptContent(document.id.clone()))?;

        debug!("downloaded document {} for user {requester_id}", document.id);
        Ok(DownloadedDocument {
            filepath: document.filepath,
            owner_id: document.owner_id,
            content,
        })
    }

    /// Destroys a document: every registry row and the record go in one
    /// transaction, then the ciphertext. A blob that is already gone counts
    /// as deleted; any other blob failure is surfaced for retry. By then no
    /// wrapped key exists, so the leftover ciphertext is unreachable.
    pub fn delete(&self, document_id: &str) -> EngineResult<()> {
        let document = self.get(document_id)?;
        self.documents.delete_cascade(&document.id)?;

        match self.blobs.delete(&document.id) {
            Ok(()) | Err(BlobError::NotFound(_)) => {}
            Err(e) => {
                warn!(
                    "ciphertext removal failed for deleted document {}: {e}",
                    document.id
                );
                return Err(e.into());
            }
        }
        info!("deleted document {}", document.id);
        Ok(())
    }

    /// Fetches a document record.
    pub fn get(&self, document_id: &str) -> EngineResult<Document> {
        self.documents
            .get(document_id)?
            .ok_or_else(|| EngineError::DocumentNotFound(document_id.to_string()))
    }

    /// User ids currently holding a wrapped key for the document.
    pub fn access_list(&self, document_id: &str) -> EngineResult<Vec<String>> {
        Ok(self.registry.list_for_document(document_id)?)
    }

    /// Documents the user holds a wrapped key for (own uploads included).
    pub fn shared_documents(&self, user_id: &str) -> EngineResult<Vec<Document>> {
        let ids = self.registry.list_for_user(user_id)?;
        Ok(self.documents.get_many(&ids)?)
    }

    fn existing_outcome(&self, document: Document) -> EngineResult<UploadOutcome> {
        let shared_with = self.registry.list_for_document(&document.id)?;
        Ok(UploadOutcome {
            document,
            shared_with,
            newly_created: false,
        })
    }

    fn resolve_users(&self, ids: &[String]) -> EngineResult<Vec<User>> {
        ids.iter()
            .map(|id| {
                self.users
                    .get(id)?
                    .ok_or_else(|| EngineError::UserNotFound(id.clone()))
            })
            .collect()
    }

    /// Wraps a DEK for every member, one registry row each.
    fn wrap_for(
        &self,
        document_id: &str,
        dek: &[u8],
        members: &[User],
    ) -> EngineResult<Vec<SharedKey>> {
        let now = Utc::now();
        members
            .iter()
            .map(|user| {
                let public = keys::public_key_from_pem(&user.public_key)?;
                let wrapped = keys::wrap_key(dek, &public)?;
                Ok(SharedKey {
                    document_id: document_id.to_string(),
                    user_id: user.id.clone(),
                    wrapped_key: wrapped,
                    created_at: now,
                })
            })
            .collect()
    }

    /// Authorization check for share/revoke: only a key that unwraps the
    /// owner's registry row recovers the DEK.
    fn unwrap_owner_dek(
        &self,
        document: &Document,
        key: &RsaPrivateKey,
    ) -> EngineResult<Vec<u8>> {
        let row = self
            .registry
            .get(&document.id, &document.owner_id)?
            .ok_or_else(|| EngineError::AccessDenied {
                document_id: document.id.clone(),
                user_id: document.owner_id.clone(),
            })?;
        keys::unwrap_key(&row.wrapped_key, key)
            .map_err(|_| EngineError::InvalidKey(document.owner_id.clone()))
    }
}
