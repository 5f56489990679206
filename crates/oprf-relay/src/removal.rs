// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

//! Removal of an identifier's secret, and the capability that authorizes it.
//!
//! By default any caller may remove an identifier's secret, since nothing in
//! the exchange proves who owns a phone number. With
//! [`RemovalPolicy::RequireToken`] a removal must also present the
//! [`RemovalToken`] returned by a recent authentication:
//! `expires_at (u64, big-endian) || HMAC-SHA-256(key, context || len(id) || id || k || expires_at)`.
//! Binding `k` ties the token to one registration, so it stops working once the
//! identifier is removed and registered again. A token only shows that its
//! bearer authenticated recently, not that it owns the number.

use std::time::{SystemTime, UNIX_EPOCH};

use oprf_core::crypto;
use oprf_core::protocol;
use oprf_core::types::{
    constant_time_eq, labels, Identifier, OprfError, OprfResult, MAC_LENGTH,
    REMOVAL_TOKEN_LENGTH, TOKEN_KEY_LENGTH,
};
use tracing::{debug, instrument, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::RemovalPolicy;
use crate::state::{storage_failure, OprfRelay};
use crate::store::{DeleteOutcome, SecretRecord, SecretStore};

const EXPIRY_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    /// Nothing was stored for the identifier. Not an error.
    NotFound,
}

/// Short-lived proof that the bearer just authenticated as an identifier.
#[derive(Clone, PartialEq, Eq)]
pub struct RemovalToken {
    expires_at: u64,
    tag: [u8; MAC_LENGTH],
}

impl RemovalToken {
    /// Unix time (seconds) after which the token is refused.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    pub fn to_bytes(&self) -> [u8; REMOVAL_TOKEN_LENGTH] {
        let mut out = [0u8; REMOVAL_TOKEN_LENGTH];
        out[..EXPIRY_LENGTH].copy_from_slice(&self.expires_at.to_be_bytes());
        out[EXPIRY_LENGTH..].copy_from_slice(&self.tag);
        out
    }

    /// # Errors
    ///
    /// Returns [`OprfError::Unauthorized`] if `bytes` is not a token.
    pub fn from_bytes(bytes: &[u8]) -> OprfResult<Self> {
        if bytes.len() != REMOVAL_TOKEN_LENGTH {
            return Err(OprfError::Unauthorized);
        }
        let mut expiry = [0u8; EXPIRY_LENGTH];
        expiry.copy_from_slice(&bytes[..EXPIRY_LENGTH]);
        let mut tag = [0u8; MAC_LENGTH];
        tag.copy_from_slice(&bytes[EXPIRY_LENGTH..]);
        Ok(Self {
            expires_at: u64::from_be_bytes(expiry),
            tag,
        })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(encoded: &str) -> OprfResult<Self> {
        let bytes = hex::decode(encoded).map_err(|_| OprfError::Unauthorized)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for RemovalToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemovalToken")
            .field("expires_at", &self.expires_at)
            .field("tag", &"[REDACTED]")
            .finish()
    }
}

/// Mints and checks removal tokens. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RemovalAuthority {
    key: [u8; TOKEN_KEY_LENGTH],
}

impl RemovalAuthority {
    pub fn generate() -> OprfResult<Self> {
        let mut key = [0u8; TOKEN_KEY_LENGTH];
        crypto::random_bytes(&mut key)?;
        Ok(Self { key })
    }

    /// Loads a persisted key so that tokens survive restarts and are shared
    /// between relays.
    ///
    /// # Errors
    ///
    /// Returns [`OprfError::InvalidInput`] if `key` is not [`TOKEN_KEY_LENGTH`]
    /// bytes or is all zeros.
    pub fn from_key(key: &[u8]) -> OprfResult<Self> {
        if key.len() != TOKEN_KEY_LENGTH || constant_time_eq(key, &[0u8; TOKEN_KEY_LENGTH]) {
            return Err(OprfError::InvalidInput);
        }
        let mut authority = Self {
            key: [0u8; TOKEN_KEY_LENGTH],
        };
        authority.key.copy_from_slice(key);
        Ok(authority)
    }

    /// Mints a token for the registration held in `record`.
    pub fn issue(&self, record: &SecretRecord, expires_at: u64) -> OprfResult<RemovalToken> {
        let tag = with_mac_input(record, expires_at, |parts| {
            crypto::hmac_sha256(&self.key, parts)
        })?;
        Ok(RemovalToken { expires_at, tag })
    }

    /// Checks the tag against `record` in constant time, then the expiry against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`OprfError::Unauthorized`] if the token was minted for another
    /// identifier, registration or key, was altered, or expired before `now`.
    pub fn verify(&self, record: &SecretRecord, token: &RemovalToken, now: u64) -> OprfResult<()> {
        with_mac_input(record, token.expires_at, |parts| {
            crypto::verify_hmac_sha256(&self.key, parts, &token.tag)
        })?;
        if now > token.expires_at {
            return Err(OprfError::Unauthorized);
        }
        Ok(())
    }
}

fn with_mac_input<R>(
    record: &SecretRecord,
    expires_at: u64,
    mac: impl FnOnce(&[&[u8]]) -> R,
) -> R {
    let identifier = record.identifier.as_bytes();
    let id_len = (identifier.len() as u64).to_be_bytes();
    let expiry = expires_at.to_be_bytes();
    let mut secret = record.scalar.to_bytes();
    let result = mac(&[
        labels::REMOVAL_TOKEN_CONTEXT,
        &id_len,
        identifier,
        &secret,
        &expiry,
    ]);
    secret.zeroize();
    result
}

impl std::fmt::Debug for RemovalAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RemovalAuthority([REDACTED])")
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[instrument(level = "debug", skip_all, fields(phone = %identifier.redacted()))]
pub fn remove<S: SecretStore>(
    relay: &OprfRelay<S>,
    identifier: &Identifier,
    token: Option<&RemovalToken>,
) -> OprfResult<RemovalOutcome> {
    let deleted = match relay.config().removal_policy {
        RemovalPolicy::IdentifierOnly => relay
            .store()
            .delete_if_present(identifier)
            .map_err(storage_failure)?,
        RemovalPolicy::RequireToken => {
            let Some(token) = token else {
                warn!("removal without token");
                return Err(OprfError::Unauthorized);
            };
            let Some(record) = relay
                .store()
                .lookup(identifier)
                .map_err(storage_failure)?
            else {
                debug!("nothing to remove");
                return Ok(RemovalOutcome::NotFound);
            };
            relay
                .removal_authority()
                .verify(&record, token, unix_now())
                .inspect_err(|_| warn!("removal token rejected"))?;
            relay
                .store()
                .delete_if_matches(&record)
                .map_err(storage_failure)?
        }
    };

    match deleted {
        DeleteOutcome::Deleted => {
            debug!("secret removed");
            Ok(RemovalOutcome::Removed)
        }
        DeleteOutcome::NotFound => {
            debug!("nothing to remove");
            Ok(RemovalOutcome::NotFound)
        }
    }
}

pub(crate) fn remove_from_wire<S: SecretStore>(
    relay: &OprfRelay<S>,
    body: &[u8],
) -> OprfResult<RemovalOutcome> {
    let wire = protocol::parse_removal_request(body)?;
    let identifier = Identifier::new(wire.phone)?;
    let token = match relay.config().removal_policy {
        RemovalPolicy::IdentifierOnly => None,
        RemovalPolicy::RequireToken => wire
            .removal_token
            .as_deref()
            .map(RemovalToken::from_hex)
            .transpose()?,
    };
    remove(relay, &identifier, token.as_ref())
}
