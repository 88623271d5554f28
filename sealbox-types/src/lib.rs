//! Shared model types for Sealbox.
//!
//! Rows for the three relations (users, documents, wrapped-key registry)
//! plus the deterministic identity scheme that makes uploads idempotent.

mod ids;
mod models;

pub use ids::{content_hash, document_id};
pub use models::{Document, SharedKey, User};
