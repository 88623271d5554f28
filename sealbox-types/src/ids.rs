//! Deterministic identity derivation.
//!
//! Document ids are content-addressed: the same `(owner, filepath, content)`
//! triple always maps to the same id, which is what makes repeated uploads
//! idempotent and serializes concurrent uploads on the primary key.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of document content.
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Deterministic document id over `(owner_id, filepath, content_hash)`.
///
/// Fields are NUL-separated before hashing so that shifting bytes between
/// fields cannot produce a colliding id.
pub fn document_id(owner_id: &str, filepath: &str, content_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(owner_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(filepath.as_bytes());
    hasher.update([0u8]);
    hasher.update(content_hash.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_is_deterministic() {
        let hash = content_hash(b"hello");
        let a = document_id("u1", "report.pdf", &hash);
        let b = document_id("u1", "report.pdf", &hash);
        assert_eq!(a, b);
    }

    #[test]
    fn document_id_varies_by_field() {
        let hash = content_hash(b"hello");
        let base = document_id("u1", "report.pdf", &hash);
        assert_ne!(base, document_id("u2", "report.pdf", &hash));
        assert_ne!(base, document_id("u1", "other.pdf", &hash));
        assert_ne!(base, document_id("u1", "report.pdf", &content_hash(b"bye")));
    }

    #[test]
    fn field_boundaries_are_separated() {
        let hash = content_hash(b"x");
        // Without separators these two would hash the same byte stream.
        assert_ne!(
            document_id("ab", "c", &hash),
            document_id("a", "bc", &hash),
        );
    }
}
