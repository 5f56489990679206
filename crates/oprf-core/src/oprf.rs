// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

//! Both halves of the OPRF exchange.
//!
//! The relay only ever calls [`evaluate`]. [`blind`], [`unblind`] and [`finalize`]
//! are the client's side, kept here so callers and tests can run full exchanges.

use k256::elliptic_curve::hash2curve::{ExpandMsgXmd, GroupDigest};
use k256::Secp256k1;
use sha2::{Digest, Sha256};

use crate::crypto::{self, CurvePoint, PointFormat, SecretScalar};
use crate::types::{labels, OprfError, OprfResult, OPRF_OUTPUT_LENGTH};

/// Maps `input` onto secp256k1 (hash-to-curve, SSWU random-oracle variant).
pub fn hash_to_group(input: &[u8]) -> OprfResult<CurvePoint> {
    if input.is_empty() {
        return Err(OprfError::InvalidInput);
    }
    let point = Secp256k1::hash_from_bytes::<ExpandMsgXmd<Sha256>>(
        &[input],
        &[labels::HASH_TO_CURVE_DST],
    )
    .map_err(|_| OprfError::CryptoError)?;
    CurvePoint::from_projective(point, PointFormat::Compressed)
}

/// Returns `(r * H(input), r)` for a fresh random `r`, encoded in `format`.
pub fn blind(input: &[u8], format: PointFormat) -> OprfResult<(CurvePoint, SecretScalar)> {
    let element = hash_to_group(input)?.with_format(format);
    let blind_scalar = crypto::random_nonzero_scalar();
    let blinded = crypto::scalar_mult(&element, &blind_scalar)?;
    Ok((blinded, blind_scalar))
}

/// Server step: `key * blinded`.
pub fn evaluate(blinded: &CurvePoint, key: &SecretScalar) -> OprfResult<CurvePoint> {
    crypto::scalar_mult(blinded, key)
}

/// Removes the blinding factor: `r^-1 * evaluated`.
pub fn unblind(blind_scalar: &SecretScalar, evaluated: &CurvePoint) -> OprfResult<CurvePoint> {
    let inverse = blind_scalar.invert()?;
    crypto::scalar_mult(evaluated, &inverse)
}

/// Unblinds `evaluated` and hashes it with the original input into the OPRF output.
pub fn finalize(
    input: &[u8],
    blind_scalar: &SecretScalar,
    evaluated: &CurvePoint,
) -> OprfResult<[u8; OPRF_OUTPUT_LENGTH]> {
    if input.is_empty() {
        return Err(OprfError::InvalidInput);
    }
    let unblinded = unblind(blind_scalar, evaluated)?.with_format(PointFormat::Compressed);

    let mut hasher = Sha256::new();
    hasher.update(labels::FINALIZE_CONTEXT);
    hasher.update((input.len() as u64).to_be_bytes());
    hasher.update(input);
    hasher.update(unblinded.to_bytes());

    let mut output = [0u8; OPRF_OUTPUT_LENGTH];
    output.copy_from_slice(&hasher.finalize());
    Ok(output)
}
