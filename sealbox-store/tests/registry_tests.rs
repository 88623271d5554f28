use chrono::Utc;
use pretty_assertions::assert_eq;
use sealbox_store::{open_in_memory, AccessRegistry};
use sealbox_types::SharedKey;

fn share(document_id: &str, user_id: &str, wrapped_key: &[u8]) -> SharedKey {
    SharedKey {
        document_id: document_id.to_string(),
        user_id: user_id.to_string(),
        wrapped_key: wrapped_key.to_vec(),
        created_at: Utc::now(),
    }
}

#[test]
fn upsert_replaces_instead_of_duplicating() {
    let registry = AccessRegistry::new(open_in_memory().unwrap());

    registry.upsert(&share("d1", "u1", b"wrap-one")).unwrap();
    registry.upsert(&share("d1", "u1", b"wrap-two")).unwrap();

    assert_eq!(registry.list_for_document("d1").unwrap(), vec!["u1".to_string()]);
    let row = registry.get("d1", "u1").unwrap().unwrap();
    assert_eq!(row.wrapped_key, b"wrap-two");
}

#[test]
fn list_for_document_and_user() {
    let registry = AccessRegistry::new(open_in_memory().unwrap());

    registry.upsert(&share("d1", "u1", b"k")).unwrap();
    registry.upsert(&share("d1", "u2", b"k")).unwrap();
    registry.upsert(&share("d2", "u2", b"k")).unwrap();

    assert_eq!(
        registry.list_for_document("d1").unwrap(),
        vec!["u1".to_string(), "u2".to_string()]
    );
    assert_eq!(
        registry.list_for_user("u2").unwrap(),
        vec!["d1".to_string(), "d2".to_string()]
    );
    assert!(registry.list_for_document("missing").unwrap().is_empty());
}

#[test]
fn upsert_many_applies_all_rows() {
    let registry = AccessRegistry::new(open_in_memory().unwrap());

    let rows = vec![
        share("d1", "u1", b"a"),
        share("d1", "u2", b"b"),
        share("d1", "u1", b"a2"), // replaces the first within the same batch
    ];
    registry.upsert_many(&rows).unwrap();

    assert_eq!(
        registry.list_for_document("d1").unwrap(),
        vec!["u1".to_string(), "u2".to_string()]
    );
    assert_eq!(registry.get("d1", "u1").unwrap().unwrap().wrapped_key, b"a2");
}

#[test]
fn delete_reports_existence() {
    let registry = AccessRegistry::new(open_in_memory().unwrap());

    registry.upsert(&share("d1", "u1", b"k")).unwrap();
    assert!(registry.delete("d1", "u1").unwrap());
    assert!(!registry.delete("d1", "u1").unwrap());
    assert!(registry.get("d1", "u1").unwrap().is_none());
}

#[test]
fn delete_many_removes_only_named_users() {
    let registry = AccessRegistry::new(open_in_memory().unwrap());

    registry.upsert(&share("d1", "u1", b"k")).unwrap();
    registry.upsert(&share("d1", "u2", b"k")).unwrap();
    registry.upsert(&share("d1", "u3", b"k")).unwrap();

    let removed = registry
        .delete_many("d1", &["u2".to_string(), "u3".to_string(), "ghost".to_string()])
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(registry.list_for_document("d1").unwrap(), vec!["u1".to_string()]);
}

#[test]
fn delete_all_for_document_clears_the_relation() {
    let registry = AccessRegistry::new(open_in_memory().unwrap());

    registry.upsert(&share("d1", "u1", b"k")).unwrap();
    registry.upsert(&share("d1", "u2", b"k")).unwrap();
    registry.upsert(&share("d2", "u1", b"k")).unwrap();

    assert_eq!(registry.delete_all_for_document("d1").unwrap(), 2);
    assert!(registry.list_for_document("d1").unwrap().is_empty());
    // Other documents are untouched
    assert_eq!(registry.list_for_document("d2").unwrap(), vec!["u1".to_string()]);
}
