//! Reads a staged data file and computes its content digest.

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{RpcError, RpcResult};

/// File content together with the digest of exactly those bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBundle {
    pub content: String,
    /// Lower-case hex SHA-256.
    pub digest: String,
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Read the whole file at `path` and digest it.
///
/// The file is read once; the digest covers the same buffer that becomes
/// the content.
pub async fn read_bundle(path: &Path) -> RpcResult<FileBundle> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| not_found(path, &e))?;
    if !metadata.is_file() {
        return Err(RpcError::FileNotFound {
            path: path.to_path_buf(),
            reason: Some("not a regular file".to_string()),
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| not_found(path, &e))?;
    let digest = digest_hex(&bytes);
    let content = String::from_utf8(bytes)
        .map_err(|e| RpcError::malformed(&format!("file {}", path.display()), e))?;

    debug!(path = %path.display(), bytes = content.len(), %digest, "Read data file");

    Ok(FileBundle { content, digest })
}

fn not_found(path: &Path, err: &std::io::Error) -> RpcError {
    let reason = (err.kind() != IoErrorKind::NotFound).then(|| err.to_string());
    RpcError::FileNotFound {
        path: path.to_path_buf(),
        reason,
    }
}
