// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF Relay
// Licensed under the MIT License

//! Phone-number OPRF relay.
//!
//! Holds one secret scalar per phone number and evaluates blinded secp256k1
//! points with it. Registration creates the secret exactly once, authentication
//! reuses it, and removal deletes it. Removal can be restricted to holders of a
//! token from a recent authentication of the current registration.

/// Authentication flow: evaluate with an existing secret.
mod authentication;
/// Relay settings and their environment overrides.
pub mod config;
/// Registration flow: create the secret, then evaluate.
mod registration;
/// Removal flow and removal tokens.
mod removal;
/// Request/response types and the relay handle.
mod state;
/// Secret store contract and the in-memory backend.
pub mod store;

pub use authentication::authenticate;
pub use config::{ConfigError, RelayConfig, RemovalPolicy};
pub use registration::register;
pub use removal::{remove, RemovalAuthority, RemovalOutcome, RemovalToken};
pub use state::{OprfRelay, ProtocolMode, ProtocolRequest, ProtocolResponse};
pub use store::{
    CreateOutcome, DeleteOutcome, MemorySecretStore, SecretDocument, SecretRecord, SecretStore,
    StoreError,
};
