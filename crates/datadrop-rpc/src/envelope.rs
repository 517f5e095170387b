//! Response envelope assembly.

use serde::Serialize;
use tracing::info;

use crate::error::{RpcError, RpcResult};
use crate::payload::PayloadRequest;
use crate::reader::FileBundle;

/// Outcome returned to the caller.
///
/// `hash` is always the digest computed from the file, never the caller's
/// claim. `content` is `null` unless the two match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub version: String,
    pub hash: String,
    pub content: Option<String>,
}

impl ResponseEnvelope {
    pub fn build(request: &PayloadRequest, bundle: FileBundle) -> Self {
        let content = if bundle.digest == request.expected_hash {
            Some(bundle.content)
        } else {
            info!(
                calculated = %bundle.digest,
                requested = %request.expected_hash,
                "Hashes are not equal"
            );
            None
        };

        Self {
            payload_type: request.payload_type.clone(),
            version: request.version.clone(),
            hash: bundle.digest,
            content,
        }
    }

    pub const fn content_sent(&self) -> bool {
        self.content.is_some()
    }

    pub fn to_json(&self) -> RpcResult<String> {
        serde_json::to_string(self).map_err(|e| RpcError::malformed("response", e))
    }
}
