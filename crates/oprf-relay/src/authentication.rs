// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

use oprf_core::oprf;
use oprf_core::types::{OprfError, OprfResult};
use tracing::{debug, instrument};

use crate::removal::unix_now;
use crate::state::{storage_failure, OprfRelay, ProtocolRequest, ProtocolResponse};
use crate::store::SecretStore;

#[instrument(level = "debug", skip_all, fields(phone = %request.identifier.redacted()))]
pub fn authenticate<S: SecretStore>(
    relay: &OprfRelay<S>,
    request: &ProtocolRequest,
) -> OprfResult<ProtocolResponse> {
    let Some(record) = relay
        .store()
        .lookup(&request.identifier)
        .map_err(storage_failure)?
    else {
        debug!("no secret for identifier");
        return Err(OprfError::NotFound);
    };

    let evaluated_element = oprf::evaluate(&request.blinded_element, &record.scalar)?;

    let expires_at = unix_now().saturating_add(relay.config().removal_token_ttl().as_secs());
    let removal_token = relay.removal_authority().issue(&record, expires_at)?;
    debug!(expires_at, "authenticated");

    Ok(ProtocolResponse {
        evaluated_element,
        removal_token: Some(removal_token),
    })
}
