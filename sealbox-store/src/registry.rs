//! The access registry: which users hold a wrapped copy of which DEK.
//!
//! One row per `(document_id, user_id)` pair, enforced by the composite
//! primary key plus `INSERT OR REPLACE`: an upsert replaces the existing
//! wrap rather than duplicating the pair, even under concurrent writers.

use crate::error::{StoreError, StoreResult};
use crate::{from_millis, to_millis, Db};
use duckdb::params;
use sealbox_types::SharedKey;

/// Store for wrapped-key rows. The row set for a document is its access list.
#[derive(Clone)]
pub struct AccessRegistry {
    conn: Db,
}

impl AccessRegistry {
    pub fn new(conn: Db) -> Self {
        Self { conn }
    }

    /// Inserts or replaces the row for `(document_id, user_id)`.
    pub fn upsert(&self, share: &SharedKey) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO shared_keys (document_id, user_id, wrapped_key, created_at)
             VALUES (?, ?, ?, ?)",
            params![
                share.document_id,
                share.user_id,
                share.wrapped_key,
                to_millis(share.created_at),
            ],
        )?;
        Ok(())
    }

    /// Upserts a batch of rows in one transaction: all or none.
    pub fn upsert_many(&self, shares: &[SharedKey]) -> StoreResult<()> {
        let mut conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
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
        Ok(())
    }

    pub fn get(&self, document_id: &str, user_id: &str) -> StoreResult<Option<SharedKey>> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let result = conn.query_row(
            "SELECT document_id, user_id, wrapped_key, created_at
             FROM shared_keys WHERE document_id = ? AND user_id = ?",
            params![document_id, user_id],
            |row| {
                Ok(SharedKey {
                    document_id: row.get(0)?,
                    user_id: row.get(1)?,
                    wrapped_key: row.get(2)?,
                    created_at: from_millis(row.get(3)?),
                })
            },
        );
        match result {
            Ok(share) => Ok(Some(share)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// User ids with access to a document.
    pub fn list_for_document(&self, document_id: &str) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT user_id FROM shared_keys WHERE document_id = ? ORDER BY user_id")?;
        let ids = stmt
            .query_map(params![document_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    /// Document ids a user holds a wrapped key for.
    pub fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT document_id FROM shared_keys WHERE user_id = ? ORDER BY document_id")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    /// Deletes one row; returns whether it existed.
    pub fn delete(&self, document_id: &str, user_id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let deleted = conn.execute(
            "DELETE FROM shared_keys WHERE document_id = ? AND user_id = ?",
            params![document_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    /// Deletes the rows for the given users in one transaction; returns the
    /// number of rows removed.
    pub fn delete_many(&self, document_id: &str, user_ids: &[String]) -> StoreResult<usize> {
        let mut conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
        let mut removed = 0;
        for user_id in user_ids {
            removed += tx.execute(
                "DELETE FROM shared_keys WHERE document_id = ? AND user_id = ?",
                params![document_id, user_id],
            )?;
        }
        tx.commit()?;
        Ok(removed)
    }

    /// Drops every row for a document; returns the number removed.
    pub fn delete_all_for_document(&self, document_id: &str) -> StoreResult<usize> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let removed = conn.execute(
            "DELETE FROM shared_keys WHERE document_id = ?",
            params![document_id],
        )?;
        Ok(removed)
    }
}
