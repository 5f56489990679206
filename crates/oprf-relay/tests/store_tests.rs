use oprf_core::crypto;
use oprf_core::types::{Identifier, OprfError};
use oprf_relay::store::*;

fn id(s: &str) -> Identifier {
    Identifier::new(s).unwrap()
}

#[test]
fn create_then_lookup_returns_same_scalar() {
    let store = MemorySecretStore::new();
    let record = SecretRecord::new(id("+15550000100"), crypto::random_nonzero_scalar());
    assert_eq!(store.create_if_absent(&record).unwrap(), CreateOutcome::Created);

    let found = store.lookup(&record.identifier).unwrap().unwrap();
    assert_eq!(found, record);
}

#[test]
fn second_create_keeps_first_scalar() {
    let store = MemorySecretStore::new();
    let first = SecretRecord::new(id("+15550000101"), crypto::random_nonzero_scalar());
    let second = SecretRecord::new(id("+15550000101"), crypto::random_nonzero_scalar());

    assert_eq!(store.create_if_absent(&first).unwrap(), CreateOutcome::Created);
    assert_eq!(store.create_if_absent(&second).unwrap(), CreateOutcome::AlreadyExists);
    assert_eq!(store.lookup(&first.identifier).unwrap().unwrap().scalar, first.scalar);
}

#[test]
fn delete_is_idempotent() {
    let store = MemorySecretStore::new();
    let record = SecretRecord::new(id("+15550000102"), crypto::random_nonzero_scalar());
    store.create_if_absent(&record).unwrap();

    assert_eq!(store.delete_if_present(&record.identifier).unwrap(), DeleteOutcome::Deleted);
    assert_eq!(store.delete_if_present(&record.identifier).unwrap(), DeleteOutcome::NotFound);
    assert!(store.lookup(&record.identifier).unwrap().is_none());
}

#[test]
fn document_key_is_fixed_width_hex() {
    let store = MemorySecretStore::new();
    let record = SecretRecord::new(id("+15550000103"), crypto::random_nonzero_scalar());
    store.create_if_absent(&record).unwrap();

    let doc = store.document(&record.identifier).unwrap();
    assert_eq!(doc.phone, "+15550000103");
    assert_eq!(doc.key.len(), 64);
    assert!(doc.key.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn corrupt_document_is_an_error_not_a_miss() {
    let store = MemorySecretStore::from_documents([SecretDocument {
        phone: "+15550000104".into(),
        key: "zz".into(),
    }]);
    let err = store.lookup(&id("+15550000104")).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
    assert!(!err.is_transient());

    let err = OprfError::from(err);
    assert_eq!(err.code(), "storage_unavailable");
    assert!(!err.is_retryable());
}

#[test]
fn outage_is_retryable() {
    let err = OprfError::from(StoreError::Unavailable("timeout".into()));
    assert_eq!(err.code(), "storage_unavailable");
    assert!(err.is_retryable());
}

#[test]
fn delete_if_matches_spares_newer_registration() {
    let store = MemorySecretStore::new();
    let earlier = SecretRecord::new(id("+15550000107"), crypto::random_nonzero_scalar());
    store.create_if_absent(&earlier).unwrap();
    assert_eq!(store.delete_if_present(&earlier.identifier).unwrap(), DeleteOutcome::Deleted);

    let later = SecretRecord::new(id("+15550000107"), crypto::random_nonzero_scalar());
    store.create_if_absent(&later).unwrap();
    assert_eq!(store.delete_if_matches(&earlier).unwrap(), DeleteOutcome::NotFound);
    assert_eq!(store.lookup(&later.identifier).unwrap().unwrap(), later);

    assert_eq!(store.delete_if_matches(&later).unwrap(), DeleteOutcome::Deleted);
    assert!(store.is_empty());
    assert_eq!(store.delete_if_matches(&later).unwrap(), DeleteOutcome::NotFound);
}

#[test]
fn clones_share_the_collection() {
    let store = MemorySecretStore::new();
    let handle = store.clone();
    let record = SecretRecord::new(id("+15550000105"), crypto::random_nonzero_scalar());
    handle.create_if_absent(&record).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn document_debug_hides_key() {
    let record = SecretRecord::new(id("+15550000106"), crypto::random_nonzero_scalar());
    let doc = record.to_document();
    let rendered = format!("{doc:?}");
    assert!(!rendered.contains(&doc.key));
    assert!(rendered.contains("***0106"));
    assert!(!rendered.contains("+1555"));
}
