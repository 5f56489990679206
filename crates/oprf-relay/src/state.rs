// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

use oprf_core::crypto::{self, CurvePoint};
use oprf_core::protocol::{self, WireRemovalResponse, WireResponse};
use oprf_core::types::{Identifier, OprfError, OprfResult};
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::removal::{RemovalAuthority, RemovalOutcome, RemovalToken};
use crate::store::{SecretStore, StoreError};
use crate::{authentication, registration, removal};

/// Which branch of the exchange a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolMode {
    Registration,
    Authentication,
}

impl ProtocolMode {
    pub fn is_registration(self) -> bool {
        self == ProtocolMode::Registration
    }
}

/// A decoded request: the point has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolRequest {
    pub identifier: Identifier,
    pub blinded_element: CurvePoint,
}

impl ProtocolRequest {
    pub fn new(identifier: Identifier, blinded_element: CurvePoint) -> Self {
        Self {
            identifier,
            blinded_element,
        }
    }

    /// Decodes `alpha_point` first, then validates `phone`.
    ///
    /// # Errors
    ///
    /// Returns [`OprfError::InvalidPoint`] for a malformed point and
    /// [`OprfError::InvalidInput`] for an empty identifier.
    pub fn from_parts(phone: &str, alpha_point: &[u8]) -> OprfResult<Self> {
        let blinded_element = crypto::decode_point(alpha_point)?;
        let identifier = Identifier::new(phone)?;
        Ok(Self::new(identifier, blinded_element))
    }

    /// Parses a JSON body `{ "phone": .., "alpha_point": .. }`.
    pub fn from_wire(body: &[u8]) -> OprfResult<Self> {
        let wire = protocol::parse_request(body)?;
        Self::from_parts(&wire.phone, wire.alpha_point.as_slice())
    }
}

/// Successful outcome of a registration or authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolResponse {
    /// `k * alpha`, encoded in the format `alpha` arrived in.
    pub evaluated_element: CurvePoint,
    /// Present after authentication only.
    pub removal_token: Option<RemovalToken>,
}

impl ProtocolResponse {
    pub fn to_wire(&self) -> WireResponse {
        WireResponse::success(
            self.evaluated_element.to_bytes(),
            self.removal_token.as_ref().map(RemovalToken::to_hex),
        )
    }
}

/// The OPRF relay: a store handle plus the key that mints removal tokens.
///
/// Holds no per-request state; share it across threads by reference or `Arc`.
pub struct OprfRelay<S> {
    store: S,
    authority: RemovalAuthority,
    config: RelayConfig,
}

impl<S: SecretStore> OprfRelay<S> {
    /// Creates a relay with a freshly generated removal-token key.
    pub fn new(store: S, config: RelayConfig) -> OprfResult<Self> {
        let authority = RemovalAuthority::generate()?;
        Ok(Self::with_authority(store, config, authority))
    }

    /// Creates a relay with an existing removal-token key, so that several
    /// relays behind one endpoint accept each other's tokens.
    pub fn with_authority(store: S, config: RelayConfig, authority: RemovalAuthority) -> Self {
        Self {
            store,
            authority,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn removal_authority(&self) -> &RemovalAuthority {
        &self.authority
    }

    pub fn handle(
        &self,
        request: &ProtocolRequest,
        mode: ProtocolMode,
    ) -> OprfResult<ProtocolResponse> {
        match mode {
            ProtocolMode::Registration => registration::register(self, request),
            ProtocolMode::Authentication => authentication::authenticate(self, request),
        }
    }

    /// Parses `body`, runs the exchange, and renders the reply. Never fails:
    /// every error becomes a sentinel response carrying its code.
    pub fn handle_wire(&self, body: &[u8], mode: ProtocolMode) -> WireResponse {
        match ProtocolRequest::from_wire(body).and_then(|request| self.handle(&request, mode)) {
            Ok(response) => response.to_wire(),
            Err(err) => {
                debug!(code = err.code(), ?mode, "request rejected");
                WireResponse::failure(&err)
            }
        }
    }

    pub fn remove(
        &self,
        identifier: &Identifier,
        token: Option<&RemovalToken>,
    ) -> OprfResult<RemovalOutcome> {
        removal::remove(self, identifier, token)
    }

    /// Parses a removal body `{ "phone": .., "removal_token"?: .. }` and renders the reply.
    pub fn remove_wire(&self, body: &[u8]) -> WireRemovalResponse {
        match removal::remove_from_wire(self, body) {
            Ok(RemovalOutcome::Removed) => WireRemovalResponse::removed(),
            Ok(RemovalOutcome::NotFound) => WireRemovalResponse::not_found(),
            Err(err) => {
                debug!(code = err.code(), "removal rejected");
                WireRemovalResponse::failure(&err)
            }
        }
    }
}

impl<S> std::fmt::Debug for OprfRelay<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OprfRelay")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub(crate) fn storage_failure(err: StoreError) -> OprfError {
    warn!(%err, "secret store failure");
    OprfError::from(err)
}
