// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

use std::fmt;

use subtle::ConstantTimeEq;
use thiserror::Error;

/// Length of a SEC1 compressed secp256k1 point in bytes.
pub const COMPRESSED_POINT_LENGTH: usize = 33;
/// Length of a SEC1 uncompressed secp256k1 point in bytes.
pub const UNCOMPRESSED_POINT_LENGTH: usize = 65;
/// Length of a big-endian secp256k1 scalar in bytes.
pub const SCALAR_LENGTH: usize = 32;
/// Length of the fixed-width hex encoding of a scalar.
pub const SCALAR_HEX_LENGTH: usize = 2 * SCALAR_LENGTH;
/// Length of an HMAC-SHA-256 tag in bytes.
pub const MAC_LENGTH: usize = 32;
/// Length of the OPRF output produced by [`crate::oprf::finalize`].
pub const OPRF_OUTPUT_LENGTH: usize = 32;
/// Length of the key used to mint removal tokens.
pub const TOKEN_KEY_LENGTH: usize = 32;
/// Length of a serialized removal token (big-endian expiry followed by the tag).
pub const REMOVAL_TOKEN_LENGTH: usize = 8 + MAC_LENGTH;

/// SEC1 tags accepted on the wire.
pub mod sec1_tags {
    pub const COMPRESSED_EVEN: u8 = 0x02;
    pub const COMPRESSED_ODD: u8 = 0x03;
    pub const UNCOMPRESSED: u8 = 0x04;
}

const _: () = assert!(COMPRESSED_POINT_LENGTH == 1 + SCALAR_LENGTH);
const _: () = assert!(UNCOMPRESSED_POINT_LENGTH == 1 + 2 * SCALAR_LENGTH);
const _: () = assert!(REMOVAL_TOKEN_LENGTH == 40);

/// Domain-separation labels.
pub mod labels {
    /// DST for hashing client inputs onto secp256k1.
    pub const HASH_TO_CURVE_DST: &[u8] = b"ECLIPTIX-PHONE-OPRF-v1/secp256k1_XMD:SHA-256_SSWU_RO_";
    /// Context for the client-side finalize hash.
    pub const FINALIZE_CONTEXT: &[u8] = b"ECLIPTIX-PHONE-OPRF-v1/Finalize";
    /// Context bound into every removal token tag.
    pub const REMOVAL_TOKEN_CONTEXT: &[u8] = b"ECLIPTIX-PHONE-OPRF-v1/RemovalToken";
}

/// Enumerates all error conditions of the phone OPRF.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OprfError {
    /// An input parameter has an invalid value or length.
    #[error("invalid input parameter")]
    InvalidInput,
    /// The blinded element is not a valid, non-identity secp256k1 point.
    #[error("invalid curve point")]
    InvalidPoint,
    /// A registration was attempted for an identifier that already holds a secret.
    #[error("identifier already registered")]
    AlreadyRegistered,
    /// No secret exists for the identifier.
    #[error("identifier not found")]
    NotFound,
    /// A removal was attempted without a valid removal token.
    #[error("removal not authorized")]
    Unauthorized,
    /// The secret store could not serve the request. `transient` is false when
    /// the same request would fail the same way again, e.g. a corrupt record.
    #[error("secret store unavailable: {reason}")]
    StorageUnavailable { reason: String, transient: bool },
    /// A request body could not be parsed.
    #[error("protocol message has invalid format")]
    InvalidProtocolMessage,
    /// A low-level cryptographic operation failed.
    #[error("cryptographic operation failed")]
    CryptoError,
}

impl OprfError {
    /// Stable machine-readable code used in response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            OprfError::InvalidInput => "invalid_input",
            OprfError::InvalidPoint => "invalid_point",
            OprfError::AlreadyRegistered => "already_registered",
            OprfError::NotFound => "not_found",
            OprfError::Unauthorized => "unauthorized",
            OprfError::StorageUnavailable { .. } => "storage_unavailable",
            OprfError::InvalidProtocolMessage => "invalid_protocol_message",
            OprfError::CryptoError => "crypto_error",
        }
    }

    /// Inverse of [`OprfError::code`]. Storage failures come back without detail
    /// and are assumed to be outages, the only kind a relay reports as retryable.
    pub fn from_code(code: &str) -> Option<Self> {
        let err = match code {
            "invalid_input" => OprfError::InvalidInput,
            "invalid_point" => OprfError::InvalidPoint,
            "already_registered" => OprfError::AlreadyRegistered,
            "not_found" => OprfError::NotFound,
            "unauthorized" => OprfError::Unauthorized,
            "storage_unavailable" => OprfError::StorageUnavailable {
                reason: String::new(),
                transient: true,
            },
            "invalid_protocol_message" => OprfError::InvalidProtocolMessage,
            "crypto_error" => OprfError::CryptoError,
            _ => return None,
        };
        Some(err)
    }

    /// Returns `true` if the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OprfError::StorageUnavailable {
                transient: true,
                ..
            }
        )
    }
}

/// Convenience alias for `Result<T, OprfError>`.
pub type OprfResult<T> = Result<T, OprfError>;

/// A user identifier (phone number).
///
/// Treated as an opaque key: no normalization is applied, equality is byte
/// equality. Normalizing to E.164 is the caller's job.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// # Errors
    ///
    /// Returns [`OprfError::InvalidInput`] if `value` is empty.
    pub fn new(value: impl Into<String>) -> OprfResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(OprfError::InvalidInput);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Masked form for log output. Shows at most the last four characters and
    /// never more than half of the identifier.
    pub fn redacted(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let keep = (chars.len() / 2).min(4);
        let tail: String = chars[chars.len() - keep..].iter().collect();
        format!("***{tail}")
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.redacted())
    }
}

impl TryFrom<String> for Identifier {
    type Error = OprfError;

    fn try_from(value: String) -> OprfResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = OprfError;

    fn try_from(value: &str) -> OprfResult<Self> {
        Self::new(value)
    }
}

/// Compares two byte slices in constant time.
///
/// Returns `false` immediately if the lengths differ (length itself is not secret).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
