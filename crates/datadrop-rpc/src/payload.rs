//! Request payload decoding and defaulting.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{RpcError, RpcResult};

/// Payload type used when the request does not name one.
pub const DEFAULT_PAYLOAD_TYPE: &str = "core";

/// Data file version used when the request does not name one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// A decoded and normalized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadRequest {
    pub payload_type: String,
    pub version: String,
    /// Digest the caller expects. Empty is a literal value, not "skip".
    pub expected_hash: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(default, rename = "type")]
    payload_type: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    hash: Option<String>,
}

impl PayloadRequest {
    /// Decode a JSON request and apply defaults.
    pub fn parse(payload: &str) -> RpcResult<Self> {
        // Derived struct decoding also accepts sequences; only objects are valid.
        let object: Map<String, Value> =
            serde_json::from_str(payload).map_err(|e| RpcError::malformed("payload", e))?;
        let raw: RawPayload = serde_json::from_value(Value::Object(object))
            .map_err(|e| RpcError::malformed("payload", e))?;

        Ok(Self {
            payload_type: non_empty_or(raw.payload_type, DEFAULT_PAYLOAD_TYPE),
            version: non_empty_or(raw.version, DEFAULT_VERSION),
            expected_hash: raw.hash.unwrap_or_default(),
        })
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
