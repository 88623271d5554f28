//! Document rows.

use crate::error::{StoreError, StoreResult};
use crate::{from_millis, to_millis, Db};
use duckdb::params;
use sealbox_types::{Document, SharedKey};
use tracing::debug;

/// Store for document records.
#[derive(Clone)]
pub struct DocumentStore {
    conn: Db,
}

impl DocumentStore {
    pub fn new(conn: Db) -> Self {
        Self { conn }
    }

    /// Creates a document together with its initial wrapped-key rows in one
    /// transaction.
    ///
    /// Returns false without writing anything if a document with this id
    /// already exists: the primary key is the serialization point for
    /// concurrent uploads of the same content, and the loser must observe
    /// the winner's state instead of erroring.
    pub fn insert_with_shares(&self, doc: &Document, shares: &[SharedKey]) -> StoreResult<bool> {
        let mut conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO documents (id, filepath, owner_id, content_hash, uploaded_on)
             VALUES (?, ?, ?, ?, ?)",
            params![
                doc.id,
                doc.filepath,
                doc.owner_id,
                doc.content_hash,
                to_millis(doc.uploaded_on),
            ],
        )?;
        if inserted == 0 {
            return Ok(false);
        }
        for share in shares {
            tx.execute(
                "INSERT OR REPLACE INTO shared_keys (document_id, user_id, wrapped_key, created_at)
                 VALUES (?, ?, ?, ?)",
                params![
                    share.document_id,
                    share.user_id,
                    share.wrapped_key,
                    to_millis(share.created_at),
                ],
            )?;
        }
        tx.commit()?;
        debug!("created document {} with {} key rows", doc.id, shares.len());
        Ok(true)
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let result = conn.query_row(
            "SELECT id, filepath, owner_id, content_hash, uploaded_on
             FROM documents WHERE id = ?",
            params![id],
            |row| {
                Ok(Document {
                    id: row.get(0)?,
                    filepath: row.get(1)?,
                    owner_id: row.get(2)?,
                    content_hash: row.get(3)?,
                    uploaded_on: from_millis(row.get(4)?),
                })
            },
        );
        match result {
            Ok(doc) => Ok(Some(doc)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetches documents by id, skipping ids that no longer exist.
    pub fn get_many(&self, ids: &[String]) -> StoreResult<Vec<Document>> {
        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(doc) = self.get(id)? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// Deletes a document record and all of its registry rows, atomically.
    ///
    /// The wrapped keys and the record go together: committing one without
    /// the other would either leak a grant or strand ciphertext keys.
    pub fn delete_cascade(&self, id: &str) -> StoreResult<()> {
        let mut conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM documents WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("document {id}")));
        }
        let shares = tx.execute("DELETE FROM shared_keys WHERE document_id = ?", params![id])?;
        tx.commit()?;
        debug!("deleted document {id} and {shares} registry rows");
        Ok(())
    }
}
