use chrono::Utc;
use pretty_assertions::assert_eq;
use sealbox_store::{open, open_in_memory, AccessRegistry, DocumentStore, StoreError, UserStore};
use sealbox_types::{Document, SharedKey, User};

fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        public_key: "-----BEGIN PUBLIC KEY-----\n...\n-----END PUBLIC KEY-----\n".to_string(),
        encrypted_private_key: vec![0xAB; 64],
        created_at: Utc::now(),
    }
}

fn document(id: &str, owner_id: &str) -> Document {
    Document {
        id: id.to_string(),
        filepath: "report.pdf".to_string(),
        owner_id: owner_id.to_string(),
        content_hash: "deadbeef".to_string(),
        uploaded_on: Utc::now(),
    }
}

fn share(document_id: &str, user_id: &str) -> SharedKey {
    SharedKey {
        document_id: document_id.to_string(),
        user_id: user_id.to_string(),
        wrapped_key: vec![0xCD; 32],
        created_at: Utc::now(),
    }
}

#[test]
fn user_insert_get_roundtrip() {
    let users = UserStore::new(open_in_memory().unwrap());

    let u = user("u1");
    users.insert(&u).unwrap();

    let fetched = users.get("u1").unwrap().unwrap();
    assert_eq!(fetched.name, u.name);
    assert_eq!(fetched.email, u.email);
    assert_eq!(fetched.public_key, u.public_key);
    assert_eq!(fetched.encrypted_private_key, u.encrypted_private_key);

    assert!(users.get("missing").unwrap().is_none());
}

#[test]
fn duplicate_user_id_rejected() {
    let users = UserStore::new(open_in_memory().unwrap());
    users.insert(&user("u1")).unwrap();
    assert!(users.insert(&user("u1")).is_err());
}

#[test]
fn user_delete_cascades_registry_rows() {
    let db = open_in_memory().unwrap();
    let users = UserStore::new(db.clone());
    let registry = AccessRegistry::new(db);

    users.insert(&user("u1")).unwrap();
    registry.upsert(&share("d1", "u1")).unwrap();
    registry.upsert(&share("d2", "u1")).unwrap();

    users.delete_cascade("u1").unwrap();
    assert!(users.get("u1").unwrap().is_none());
    assert!(registry.list_for_user("u1").unwrap().is_empty());

    assert!(matches!(
        users.delete_cascade("u1"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn insert_with_shares_creates_document_and_rows() {
    let db = open_in_memory().unwrap();
    let documents = DocumentStore::new(db.clone());
    let registry = AccessRegistry::new(db);

    let created = documents
        .insert_with_shares(&document("d1", "u1"), &[share("d1", "u1"), share("d1", "u2")])
        .unwrap();
    assert!(created);

    let fetched = documents.get("d1").unwrap().unwrap();
    assert_eq!(fetched.owner_id, "u1");
    assert_eq!(
        registry.list_for_document("d1").unwrap(),
        vec!["u1".to_string(), "u2".to_string()]
    );
}

#[test]
fn insert_with_shares_is_noop_when_id_exists() {
    let db = open_in_memory().unwrap();
    let documents = DocumentStore::new(db.clone());
    let registry = AccessRegistry::new(db);

    assert!(documents
        .insert_with_shares(&document("d1", "u1"), &[share("d1", "u1")])
        .unwrap());
    // Loser of the race: nothing changes, not even new share rows
    assert!(!documents
        .insert_with_shares(&document("d1", "u1"), &[share("d1", "u1"), share("d1", "u9")])
        .unwrap());

    assert_eq!(registry.list_for_document("d1").unwrap(), vec!["u1".to_string()]);
}

#[test]
fn document_delete_cascades_registry_rows() {
    let db = open_in_memory().unwrap();
    let documents = DocumentStore::new(db.clone());
    let registry = AccessRegistry::new(db);

    documents
        .insert_with_shares(&document("d1", "u1"), &[share("d1", "u1"), share("d1", "u2")])
        .unwrap();

    documents.delete_cascade("d1").unwrap();
    assert!(documents.get("d1").unwrap().is_none());
    assert!(registry.list_for_document("d1").unwrap().is_empty());

    assert!(matches!(
        documents.delete_cascade("d1"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn get_many_skips_missing_documents() {
    let documents = DocumentStore::new(open_in_memory().unwrap());
    documents
        .insert_with_shares(&document("d1", "u1"), &[])
        .unwrap();

    let docs = documents
        .get_many(&["d1".to_string(), "ghost".to_string()])
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "d1");
}

#[test]
fn file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sealbox.db");

    {
        let users = UserStore::new(open(&path).unwrap());
        users.insert(&user("u1")).unwrap();
    }

    let users = UserStore::new(open(&path).unwrap());
    assert!(users.get("u1").unwrap().is_some());
}
