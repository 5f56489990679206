// Copyright (c) 2026 Oleksandr Melnychenko, Ukraine
// Ecliptix Security — Phone OPRF
// Licensed under the MIT License

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::types::{OprfError, OprfResult};

/// Marker the legacy wire format puts in `beta_point` when there is no output.
pub const NONE_SENTINEL: &str = "None";
/// `type` field of a Node.js `Buffer` serialized through `JSON.stringify`.
pub const NODE_BUFFER_TYPE: &str = "Buffer";

pub const STATUS_REMOVED: &str = "removed";
pub const STATUS_NOT_FOUND: &str = "not_found";

/// Raw bytes in a JSON body.
///
/// Accepts a plain array of octets or a Node `Buffer` object
/// (`{"type":"Buffer","data":[..]}`); always emits the `Buffer` object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WireBytes(pub Vec<u8>);

impl WireBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for WireBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

#[derive(Serialize)]
struct NodeBufferRef<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a [u8],
}

#[derive(Deserialize)]
struct NodeBuffer {
    #[serde(rename = "type")]
    kind: String,
    data: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytes {
    Octets(Vec<u8>),
    Buffer(NodeBuffer),
}

impl Serialize for WireBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeBufferRef {
            kind: NODE_BUFFER_TYPE,
            data: &self.0,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WireBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawBytes::deserialize(deserializer)? {
            RawBytes::Octets(data) => Ok(Self(data)),
            RawBytes::Buffer(buffer) if buffer.kind == NODE_BUFFER_TYPE => Ok(Self(buffer.data)),
            RawBytes::Buffer(buffer) => Err(de::Error::custom(format!(
                "unsupported byte container type `{}`",
                buffer.kind
            ))),
        }
    }
}

/// The `beta_point` field: an encoded point, or the `"None"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetaPoint {
    Point(WireBytes),
    Absent,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBeta {
    Sentinel(String),
    Point(WireBytes),
}

impl Serialize for BetaPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BetaPoint::Point(bytes) => bytes.serialize(serializer),
            BetaPoint::Absent => serializer.serialize_str(NONE_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for BetaPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawBeta::deserialize(deserializer)? {
            RawBeta::Point(bytes) => Ok(BetaPoint::Point(bytes)),
            RawBeta::Sentinel(s) if s == NONE_SENTINEL => Ok(BetaPoint::Absent),
            RawBeta::Sentinel(s) => Err(de::Error::custom(format!("unexpected beta_point `{s}`"))),
        }
    }
}

/// Body of a registration or authentication request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    pub phone: String,
    pub alpha_point: WireBytes,
}

/// Body of a removal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRemovalRequest {
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_token: Option<String>,
}

/// Body answered to registration and authentication requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireResponse {
    pub beta_point: BetaPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WireResponse {
    pub fn success(beta_point: Vec<u8>, removal_token: Option<String>) -> Self {
        Self {
            beta_point: BetaPoint::Point(WireBytes(beta_point)),
            removal_token,
            error: None,
        }
    }

    /// Keeps the `"None"` sentinel for older clients and names the cause in `error`.
    pub fn failure(err: &OprfError) -> Self {
        Self {
            beta_point: BetaPoint::Absent,
            removal_token: None,
            error: Some(err.code().to_owned()),
        }
    }

    /// Client view: the encoded output point, or the error the relay reported.
    ///
    /// A bare sentinel with no `error` field (older relays) maps to
    /// [`OprfError::InvalidProtocolMessage`], since the cause is unknowable.
    pub fn into_result(self) -> OprfResult<Vec<u8>> {
        match (self.beta_point, self.error) {
            (BetaPoint::Point(bytes), None) => Ok(bytes.into_inner()),
            (_, Some(code)) => {
                Err(OprfError::from_code(&code).unwrap_or(OprfError::InvalidProtocolMessage))
            }
            (BetaPoint::Absent, None) => Err(OprfError::InvalidProtocolMessage),
        }
    }
}

/// Body answered to removal requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRemovalResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WireRemovalResponse {
    pub fn removed() -> Self {
        Self {
            status: Some(STATUS_REMOVED.to_owned()),
            error: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: Some(STATUS_NOT_FOUND.to_owned()),
            error: None,
        }
    }

    pub fn failure(err: &OprfError) -> Self {
        Self {
            status: None,
            error: Some(err.code().to_owned()),
        }
    }
}

/// Parses a registration or authentication body.
///
/// # Errors
///
/// Returns [`OprfError::InvalidProtocolMessage`] if `body` is not a valid request.
pub fn parse_request(body: &[u8]) -> OprfResult<WireRequest> {
    serde_json::from_slice(body).map_err(|_| OprfError::InvalidProtocolMessage)
}

/// Parses a removal body.
///
/// # Errors
///
/// Returns [`OprfError::InvalidProtocolMessage`] if `body` is not a valid request.
pub fn parse_removal_request(body: &[u8]) -> OprfResult<WireRemovalRequest> {
    serde_json::from_slice(body).map_err(|_| OprfError::InvalidProtocolMessage)
}

/// Serializes any wire body to JSON text.
pub fn write_body<T: Serialize>(body: &T) -> OprfResult<String> {
    serde_json::to_string(body).map_err(|_| OprfError::InvalidProtocolMessage)
}
