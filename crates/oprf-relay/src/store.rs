// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

//! Persistent mapping from identifier to secret scalar.
//!
//! The relay only needs three operations, and the store alone decides who wins
//! when two writers race on the same identifier.

use std::collections::HashMap;
use std::sync::Arc;

use oprf_core::crypto::SecretScalar;
use oprf_core::types::{Identifier, OprfError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Errors raised by a [`SecretStore`] backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A persisted document does not decode to a valid record.
    #[error("corrupt record for {0}")]
    Corrupt(String),
}

impl StoreError {
    /// An outage may clear up; a corrupt record fails the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<StoreError> for OprfError {
    fn from(err: StoreError) -> Self {
        OprfError::StorageUnavailable {
            transient: err.is_transient(),
            reason: err.to_string(),
        }
    }
}

/// One identifier's secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub identifier: Identifier,
    pub scalar: SecretScalar,
}

impl SecretRecord {
    pub fn new(identifier: Identifier, scalar: SecretScalar) -> Self {
        Self { identifier, scalar }
    }

    pub fn to_document(&self) -> SecretDocument {
        SecretDocument {
            phone: self.identifier.as_str().to_owned(),
            key: self.scalar.to_hex(),
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if either field fails validation.
    pub fn from_document(document: &SecretDocument) -> Result<Self, StoreError> {
        let corrupt = || StoreError::Corrupt(document.redacted_phone());
        let identifier = Identifier::new(document.phone.clone()).map_err(|_| corrupt())?;
        let scalar = SecretScalar::from_hex(&document.key).map_err(|_| corrupt())?;
        Ok(Self { identifier, scalar })
    }
}

/// Persisted form of a [`SecretRecord`], partitioned by `phone`.
///
/// `key` is the scalar as 64 lowercase hex digits.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDocument {
    pub phone: String,
    pub key: String,
}

impl SecretDocument {
    fn redacted_phone(&self) -> String {
        Identifier::new(self.phone.clone())
            .map(|id| id.redacted())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for SecretDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretDocument")
            .field("phone", &self.redacted_phone())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Contract every secret backend satisfies.
///
/// `create_if_absent` and `delete_if_present` must be atomic per identifier.
/// Backend failures are reported as [`StoreError`], never as a missing record.
pub trait SecretStore: Send + Sync {
    fn lookup(&self, identifier: &Identifier) -> Result<Option<SecretRecord>, StoreError>;

    fn create_if_absent(&self, record: &SecretRecord) -> Result<CreateOutcome, StoreError>;

    fn delete_if_present(&self, identifier: &Identifier) -> Result<DeleteOutcome, StoreError>;

    /// Deletes the record only while it still holds `record.scalar`, so a
    /// secret registered after `record` was read is left alone.
    fn delete_if_matches(&self, record: &SecretRecord) -> Result<DeleteOutcome, StoreError>;
}

impl<S: SecretStore + ?Sized> SecretStore for Arc<S> {
    fn lookup(&self, identifier: &Identifier) -> Result<Option<SecretRecord>, StoreError> {
        (**self).lookup(identifier)
    }

    fn create_if_absent(&self, record: &SecretRecord) -> Result<CreateOutcome, StoreError> {
        (**self).create_if_absent(record)
    }

    fn delete_if_present(&self, identifier: &Identifier) -> Result<DeleteOutcome, StoreError> {
        (**self).delete_if_present(identifier)
    }

    fn delete_if_matches(&self, record: &SecretRecord) -> Result<DeleteOutcome, StoreError> {
        (**self).delete_if_matches(record)
    }
}

/// In-process document collection keyed by phone.
///
/// Cloning yields another handle onto the same collection. Records are kept in
/// their persisted [`SecretDocument`] form and decoded on every lookup.
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    documents: Arc<RwLock<HashMap<String, SecretDocument>>>,
}

impl std::fmt::Debug for MemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySecretStore")
            .field("records", &self.len())
            .finish()
    }
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store over pre-existing documents, e.g. a snapshot of another backend.
    pub fn from_documents(documents: impl IntoIterator<Item = SecretDocument>) -> Self {
        let map = documents
            .into_iter()
            .map(|doc| (doc.phone.clone(), doc))
            .collect();
        Self {
            documents: Arc::new(RwLock::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Raw persisted document for `identifier`, if any.
    pub fn document(&self, identifier: &Identifier) -> Option<SecretDocument> {
        self.documents.read().get(identifier.as_str()).cloned()
    }
}

impl SecretStore for MemorySecretStore {
    fn lookup(&self, identifier: &Identifier) -> Result<Option<SecretRecord>, StoreError> {
        let documents = self.documents.read();
        documents
            .get(identifier.as_str())
            .map(SecretRecord::from_document)
            .transpose()
    }

    fn create_if_absent(&self, record: &SecretRecord) -> Result<CreateOutcome, StoreError> {
        let mut documents = self.documents.write();
        if documents.contains_key(record.identifier.as_str()) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        documents.insert(record.identifier.as_str().to_owned(), record.to_document());
        Ok(CreateOutcome::Created)
    }

    fn delete_if_present(&self, identifier: &Identifier) -> Result<DeleteOutcome, StoreError> {
        match self.documents.write().remove(identifier.as_str()) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    fn delete_if_matches(&self, record: &SecretRecord) -> Result<DeleteOutcome, StoreError> {
        let mut documents = self.documents.write();
        let Some(document) = documents.get(record.identifier.as_str()) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if SecretRecord::from_document(document)?.scalar != record.scalar {
            return Ok(DeleteOutcome::NotFound);
        }
        documents.remove(record.identifier.as_str());
        Ok(DeleteOutcome::Deleted)
    }
}
