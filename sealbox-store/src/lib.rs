//! Relational tier for Sealbox, backed by DuckDB.
//!
//! Three stores share one connection: `UserStore`, `DocumentStore`, and
//! `AccessRegistry`. The connection handle is created explicitly and passed
//! into each store (and from there into the engine); there is no global
//! database state, so tests run against in-memory instances.
//!
//! Multi-row operations that carry access-control invariants
//! (document-plus-shares creation, cascade deletes, bulk upserts) run inside
//! a single transaction: they fully apply or fully roll back.

mod documents;
mod error;
mod registry;
mod users;

pub use documents::DocumentStore;
pub use error::{StoreError, StoreResult};
pub use registry::AccessRegistry;
pub use users::UserStore;

use chrono::{DateTime, Utc};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Shared database handle.
pub type Db = Arc<Mutex<Connection>>;

/// Opens (or creates) a database file and initializes the schema.
pub fn open(path: &Path) -> StoreResult<Db> {
    let conn = Connection::open(path).map_err(StoreError::from)?;
    // Cap memory/threads, DuckDB defaults to ~80% RAM per connection
    conn.execute_batch("PRAGMA memory_limit='128MB'; PRAGMA threads=1;")?;
    initialize_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Opens an in-memory database (for testing).
pub fn open_in_memory() -> StoreResult<Db> {
    let conn = Connection::open_in_memory().map_err(StoreError::from)?;
    initialize_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id VARCHAR PRIMARY KEY,
            name VARCHAR NOT NULL,
            email VARCHAR NOT NULL,
            public_key VARCHAR NOT NULL,
            encrypted_private_key BLOB NOT NULL,
            created_at BIGINT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS documents (
            id VARCHAR PRIMARY KEY,
            filepath VARCHAR NOT NULL,
            owner_id VARCHAR NOT NULL,
            content_hash VARCHAR NOT NULL,
            uploaded_on BIGINT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS shared_keys (
            document_id VARCHAR NOT NULL,
            user_id VARCHAR NOT NULL,
            wrapped_key BLOB NOT NULL,
            created_at BIGINT NOT NULL,
            PRIMARY KEY (document_id, user_id)
        );",
    )?;
    Ok(())
}

pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
