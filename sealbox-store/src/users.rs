//! User rows.

use crate::error::{StoreError, StoreResult};
use crate::{from_millis, to_millis, Db};
use duckdb::params;
use sealbox_types::User;
use tracing::debug;

/// Store for user rows and their key material.
#[derive(Clone)]
pub struct UserStore {
    conn: Db,
}

impl UserStore {
    pub fn new(conn: Db) -> Self {
        Self { conn }
    }

    /// Inserts a new user. Fails if the id is already taken.
    pub fn insert(&self, user: &User) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        conn.execute(
            "INSERT INTO users (id, name, email, public_key, encrypted_private_key, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                user.id,
                user.name,
                user.email,
                user.public_key,
                user.encrypted_private_key,
                to_millis(user.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let result = conn.query_row(
            "SELECT id, name, email, public_key, encrypted_private_key, created_at
             FROM users WHERE id = ?",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    public_key: row.get(3)?,
                    encrypted_private_key: row.get(4)?,
                    created_at: from_millis(row.get(5)?),
                })
            },
        );
        match result {
            Ok(user) => Ok(Some(user)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a user and every registry row they hold, atomically.
    pub fn delete_cascade(&self, id: &str) -> StoreResult<()> {
        let mut conn = self.conn.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM users WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("user {id}")));
        }
        let shares = tx.execute("DELETE FROM shared_keys WHERE user_id = ?", params![id])?;
        tx.commit()?;
        debug!("deleted user {id} and {shares} registry rows");
        Ok(())
    }
}
