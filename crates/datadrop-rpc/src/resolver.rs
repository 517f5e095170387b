//! Maps a `(type, version)` pair to the staged data file path.

use std::path::{Path, PathBuf};

use crate::context::AuthenticatedContext;
use crate::error::{RpcError, RpcResult};

/// Build `<prefix>/<type>/<version>.json`.
///
/// The prefix is the caller context's override when present, otherwise
/// `default_prefix`. Both tokens are restricted to a path-safe charset.
pub fn resolve_file_path(
    ctx: &AuthenticatedContext,
    default_prefix: &Path,
    payload_type: &str,
    version: &str,
) -> RpcResult<PathBuf> {
    ensure_path_token("type", payload_type)?;
    ensure_path_token("version", version)?;

    let prefix = ctx.file_path_prefix().unwrap_or(default_prefix);
    Ok(prefix
        .join(payload_type)
        .join(format!("{version}.json")))
}

fn ensure_path_token(field: &str, token: &str) -> RpcResult<()> {
    let charset_ok = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

    if token.is_empty() || token == "." || token == ".." || !charset_ok {
        return Err(RpcError::MalformedInput(format!(
            "{field} {token:?} is not a valid path token"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::error::ErrorKind;

    fn ctx(prefix: Option<&str>) -> AuthenticatedContext {
        let mut ctx = ExecutionContext::new().with_user("1");
        if let Some(prefix) = prefix {
            ctx = ctx.with_file_path_prefix(prefix);
        }
        ctx.authenticate().unwrap()
    }

    #[test]
    fn uses_default_prefix_without_override() {
        let path = resolve_file_path(&ctx(None), Path::new("/user_files"), "core", "1.0.0").unwrap();
        assert_eq!(path, PathBuf::from("/user_files/core/1.0.0.json"));
    }

    #[test]
    fn context_override_wins() {
        let path = resolve_file_path(
            &ctx(Some("./user_files")),
            Path::new("/user_files"),
            "score",
            "2.0.0",
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("./user_files/score/2.0.0.json"));
    }

    #[test]
    fn traversal_tokens_are_rejected() {
        for (payload_type, version) in [
            ("..", "1.0.0"),
            ("core", "../../etc/passwd"),
            ("co/re", "1.0.0"),
            ("core", "1.0.0\0"),
        ] {
            let err = resolve_file_path(&ctx(None), Path::new("/user_files"), payload_type, version)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedInput, "{payload_type}/{version}");
        }
    }
}
