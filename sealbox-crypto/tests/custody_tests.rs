use sealbox_crypto::{
    generate_credential, generate_key_pair, protect_private_key, unlock_private_key, Argon2Kdf,
    Kdf, KdfParams, ProtectedPrivateKey,
};

/// Cheap parameters so the test suite doesn't pay full Argon2id cost per case.
fn test_kdf() -> Argon2Kdf {
    Argon2Kdf::new(KdfParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
}

#[test]
fn credential_is_twelve_hyphenated_words() {
    let credential = generate_credential().unwrap();
    let words: Vec<&str> = credential.split('-').collect();
    assert_eq!(words.len(), 12);
    assert!(words.iter().all(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_lowercase())));
}

#[test]
fn credentials_are_unique() {
    let a = generate_credential().unwrap();
    let b = generate_credential().unwrap();
    assert_ne!(a, b);
}

#[test]
fn protect_unlock_roundtrip() {
    let kdf = test_kdf();
    let pair = generate_key_pair().unwrap();
    let credential = generate_credential().unwrap();

    let protected = protect_private_key(&pair.private, &credential, &kdf).unwrap();
    let unlocked = unlock_private_key(&protected, &credential, &kdf).unwrap();
    assert_eq!(unlocked, pair.private);
}

#[test]
fn wrong_credential_fails() {
    let kdf = test_kdf();
    let pair = generate_key_pair().unwrap();

    let protected = protect_private_key(&pair.private, "correct-horse-battery", &kdf).unwrap();
    assert!(unlock_private_key(&protected, "wrong-horse-battery", &kdf).is_err());
}

#[test]
fn byte_roundtrip_preserves_unlockability() {
    let kdf = test_kdf();
    let pair = generate_key_pair().unwrap();
    let credential = generate_credential().unwrap();

    let protected = protect_private_key(&pair.private, &credential, &kdf).unwrap();
    let bytes = protected.to_bytes();
    let restored = ProtectedPrivateKey::from_bytes(&bytes).unwrap();

    assert_eq!(restored.salt, protected.salt);
    let unlocked = unlock_private_key(&restored, &credential, &kdf).unwrap();
    assert_eq!(unlocked, pair.private);
}

#[test]
fn short_blob_rejected() {
    assert!(ProtectedPrivateKey::from_bytes(&[0u8; 47]).is_err());
}

#[test]
fn tampered_blob_fails_unlock() {
    let kdf = test_kdf();
    let pair = generate_key_pair().unwrap();
    let credential = generate_credential().unwrap();

    let mut protected = protect_private_key(&pair.private, &credential, &kdf).unwrap();
    let last = protected.sealed.len() - 1;
    protected.sealed[last] ^= 0x01;
    assert!(unlock_private_key(&protected, &credential, &kdf).is_err());
}

#[test]
fn distinct_salts_per_protection() {
    let kdf = test_kdf();
    let pair = generate_key_pair().unwrap();

    let a = protect_private_key(&pair.private, "same-credential", &kdf).unwrap();
    let b = protect_private_key(&pair.private, "same-credential", &kdf).unwrap();
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.sealed, b.sealed);
}

#[test]
fn kdf_is_deterministic_for_same_salt() {
    let kdf = test_kdf();
    let salt = sealbox_crypto::Salt::random();
    let a = kdf.derive("credential", &salt).unwrap();
    let b = kdf.derive("credential", &salt).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());

    let c = kdf.derive("other", &salt).unwrap();
    assert_ne!(a.as_bytes(), c.as_bytes());
}
