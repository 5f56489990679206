// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

use std::fmt;

use hmac::{Hmac, Mac};
use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::types::{
    sec1_tags, OprfError, OprfResult, COMPRESSED_POINT_LENGTH, MAC_LENGTH, SCALAR_HEX_LENGTH,
    SCALAR_LENGTH, UNCOMPRESSED_POINT_LENGTH,
};

type HmacSha256 = Hmac<Sha256>;

/// SEC1 layout a point arrived in, and is answered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointFormat {
    /// 33 bytes, tag `0x02`/`0x03` followed by x.
    Compressed,
    /// 65 bytes, tag `0x04` followed by x and y.
    Uncompressed,
}

impl PointFormat {
    pub fn encoded_length(self) -> usize {
        match self {
            PointFormat::Compressed => COMPRESSED_POINT_LENGTH,
            PointFormat::Uncompressed => UNCOMPRESSED_POINT_LENGTH,
        }
    }
}

/// A validated, non-identity secp256k1 point.
///
/// Only [`decode_point`] and the arithmetic in this module construct it, so a
/// `CurvePoint` in hand is always on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurvePoint {
    point: ProjectivePoint,
    format: PointFormat,
}

impl CurvePoint {
    /// The group generator `G`, in compressed format.
    pub fn generator() -> Self {
        Self {
            point: ProjectivePoint::GENERATOR,
            format: PointFormat::Compressed,
        }
    }

    pub fn format(&self) -> PointFormat {
        self.format
    }

    /// Same point, encoded in `format` from now on.
    pub fn with_format(self, format: PointFormat) -> Self {
        Self { format, ..self }
    }

    /// Encodes the point in its own format. See [`encode_point`].
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_point(self)
    }

    /// Group equality, ignoring the encoding format.
    pub fn same_point(&self, other: &CurvePoint) -> bool {
        self.point == other.point
    }

    pub(crate) fn from_projective(point: ProjectivePoint, format: PointFormat) -> OprfResult<Self> {
        if bool::from(point.is_identity()) {
            return Err(OprfError::CryptoError);
        }
        Ok(Self { point, format })
    }

    pub(crate) fn projective(&self) -> &ProjectivePoint {
        &self.point
    }
}

/// A secret scalar in `[1, n-1]`, `n` being the secp256k1 group order.
///
/// Zeroized on drop. `Debug` never prints the value.
#[derive(Clone)]
pub struct SecretScalar(Scalar);

impl SecretScalar {
    /// Parses a big-endian scalar.
    ///
    /// # Errors
    ///
    /// Returns [`OprfError::InvalidInput`] if `bytes` is not [`SCALAR_LENGTH`] long,
    /// encodes a value `>= n`, or encodes zero.
    pub fn from_bytes(bytes: &[u8]) -> OprfResult<Self> {
        if bytes.len() != SCALAR_LENGTH {
            return Err(OprfError::InvalidInput);
        }
        let repr = *FieldBytes::from_slice(bytes);
        let scalar =
            Option::<Scalar>::from(Scalar::from_repr(repr)).ok_or(OprfError::InvalidInput)?;
        if bool::from(scalar.is_zero()) {
            return Err(OprfError::InvalidInput);
        }
        Ok(Self(scalar))
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_LENGTH] {
        let mut repr = self.0.to_bytes();
        let mut out = [0u8; SCALAR_LENGTH];
        out.copy_from_slice(&repr);
        repr.as_mut_slice().zeroize();
        out
    }

    /// Fixed-width lowercase hex, the persisted form of a secret.
    pub fn to_hex(&self) -> String {
        let mut bytes = self.to_bytes();
        let encoded = hex::encode(bytes);
        bytes.zeroize();
        encoded
    }

    /// # Errors
    ///
    /// Returns [`OprfError::InvalidInput`] unless `encoded` is exactly
    /// [`SCALAR_HEX_LENGTH`] hex digits of a value in `[1, n-1]`.
    pub fn from_hex(encoded: &str) -> OprfResult<Self> {
        if encoded.len() != SCALAR_HEX_LENGTH {
            return Err(OprfError::InvalidInput);
        }
        let mut bytes = [0u8; SCALAR_LENGTH];
        hex::decode_to_slice(encoded, &mut bytes).map_err(|_| OprfError::InvalidInput)?;
        let scalar = Self::from_bytes(&bytes);
        bytes.zeroize();
        scalar
    }

    /// Multiplicative inverse modulo `n`.
    pub fn invert(&self) -> OprfResult<Self> {
        let inverse = Option::<Scalar>::from(self.0.invert()).ok_or(OprfError::CryptoError)?;
        Ok(Self(inverse))
    }

    pub(crate) fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

impl PartialEq for SecretScalar {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SecretScalar {}

impl Drop for SecretScalar {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar([REDACTED])")
    }
}

/// Fills `buf` with bytes from the operating system CSPRNG.
///
/// # Errors
///
/// Returns [`OprfError::InvalidInput`] if `buf` is empty.
/// Returns [`OprfError::CryptoError`] if the OS generator fails.
pub fn random_bytes(buf: &mut [u8]) -> OprfResult<()> {
    if buf.is_empty() {
        return Err(OprfError::InvalidInput);
    }
    OsRng.try_fill_bytes(buf).map_err(|_| OprfError::CryptoError)
}

/// Samples a scalar uniformly from `[1, n-1]`.
///
/// 32 bytes are drawn from the OS CSPRNG and read big-endian; draws that are zero
/// or not below `n` are discarded and redrawn. Rejection keeps the distribution
/// free of modulo bias.
pub fn random_nonzero_scalar() -> SecretScalar {
    loop {
        let mut bytes = [0u8; SCALAR_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        let candidate = SecretScalar::from_bytes(&bytes);
        bytes.zeroize();
        if let Ok(scalar) = candidate {
            return scalar;
        }
    }
}

/// Decodes a SEC1 compressed or uncompressed secp256k1 point.
///
/// # Errors
///
/// Returns [`OprfError::InvalidPoint`] if the length and tag do not match one of
/// the two accepted layouts, if the coordinates are not on the curve, or if the
/// encoding denotes the identity.
pub fn decode_point(bytes: &[u8]) -> OprfResult<CurvePoint> {
    let tag = *bytes.first().ok_or(OprfError::InvalidPoint)?;
    let format = match (bytes.len(), tag) {
        (COMPRESSED_POINT_LENGTH, sec1_tags::COMPRESSED_EVEN | sec1_tags::COMPRESSED_ODD) => {
            PointFormat::Compressed
        }
        (UNCOMPRESSED_POINT_LENGTH, sec1_tags::UNCOMPRESSED) => PointFormat::Uncompressed,
        _ => return Err(OprfError::InvalidPoint),
    };

    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| OprfError::InvalidPoint)?;
    let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or(OprfError::InvalidPoint)?;

    CurvePoint::from_projective(ProjectivePoint::from(affine), format)
        .map_err(|_| OprfError::InvalidPoint)
}

/// Encodes a point in canonical SEC1 form, using the point's own format.
pub fn encode_point(point: &CurvePoint) -> Vec<u8> {
    let compress = point.format == PointFormat::Compressed;
    point
        .point
        .to_affine()
        .to_encoded_point(compress)
        .as_bytes()
        .to_vec()
}

/// Computes `scalar * point` in constant time with respect to `scalar`.
///
/// The result keeps the format of `point`.
///
/// # Errors
///
/// Returns [`OprfError::CryptoError`] if the product is the identity.
pub fn scalar_mult(point: &CurvePoint, scalar: &SecretScalar) -> OprfResult<CurvePoint> {
    let product = *point.projective() * scalar.as_scalar();
    CurvePoint::from_projective(product, point.format)
}

/// Computes `scalar * G`.
pub fn scalarmult_base(scalar: &SecretScalar) -> OprfResult<CurvePoint> {
    scalar_mult(&CurvePoint::generator(), scalar)
}

/// Computes HMAC-SHA-256 over the concatenation of `parts`.
///
/// # Errors
///
/// Returns [`OprfError::InvalidInput`] if `key` is empty.
pub fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> OprfResult<[u8; MAC_LENGTH]> {
    if key.is_empty() {
        return Err(OprfError::InvalidInput);
    }
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| OprfError::CryptoError)?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; MAC_LENGTH];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Recomputes HMAC-SHA-256 over `parts` and compares it to `expected` in constant time.
///
/// # Errors
///
/// Returns [`OprfError::InvalidInput`] if `key` is empty.
/// Returns [`OprfError::Unauthorized`] if the tag does not match.
pub fn verify_hmac_sha256(key: &[u8], parts: &[&[u8]], expected: &[u8]) -> OprfResult<()> {
    if key.is_empty() {
        return Err(OprfError::InvalidInput);
    }
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| OprfError::CryptoError)?;
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(expected).map_err(|_| OprfError::Unauthorized)
}
