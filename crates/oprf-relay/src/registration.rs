// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

use oprf_core::types::{OprfError, OprfResult};
use oprf_core::{crypto, oprf};
use tracing::{debug, instrument};

use crate::state::{storage_failure, OprfRelay, ProtocolRequest, ProtocolResponse};
use crate::store::{CreateOutcome, SecretRecord, SecretStore};

/// First contact for an identifier: draw its secret, persist it, and evaluate.
///
/// The lookup only spares a CSPRNG draw for the common case. The store's
/// `create_if_absent` decides concurrent registrations, and a loser gets
/// [`OprfError::AlreadyRegistered`] just like a late caller.
#[instrument(level = "debug", skip_all, fields(phone = %request.identifier.redacted()))]
pub fn register<S: SecretStore>(
    relay: &OprfRelay<S>,
    request: &ProtocolRequest,
) -> OprfResult<ProtocolResponse> {
    let store = relay.store();

    if store
        .lookup(&request.identifier)
        .map_err(storage_failure)?
        .is_some()
    {
        debug!("identifier already holds a secret");
        return Err(OprfError::AlreadyRegistered);
    }

    let record = SecretRecord::new(request.identifier.clone(), crypto::random_nonzero_scalar());
    match store.create_if_absent(&record).map_err(storage_failure)? {
        CreateOutcome::Created => {}
        CreateOutcome::AlreadyExists => {
            debug!("lost registration race");
            return Err(OprfError::AlreadyRegistered);
        }
    }

    let evaluated_element = oprf::evaluate(&request.blinded_element, &record.scalar)?;
    debug!("secret created");

    Ok(ProtocolResponse {
        evaluated_element,
        removal_token: None,
    })
}
