//! Request-scoped execution context supplied by the hosting environment.
//!
//! The host resolves the caller and may override where data files live.
//! Neither value comes from the request payload.

use std::path::{Path, PathBuf};

use crate::error::{RpcError, RpcResult};

/// Identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context as handed over by the host, before the identity gate.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub user_id: Option<String>,
    pub file_path_prefix: Option<PathBuf>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_file_path_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.file_path_prefix = Some(prefix.into());
        self
    }

    /// Require a resolved caller identity.
    ///
    /// A missing or blank user id fails with `Unauthenticated`.
    pub fn authenticate(&self) -> RpcResult<AuthenticatedContext> {
        let user_id = self
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(RpcError::Unauthenticated)?;

        Ok(AuthenticatedContext {
            caller: CallerId(user_id.to_string()),
            file_path_prefix: self.file_path_prefix.clone(),
        })
    }
}

/// Context that has passed the identity gate.
#[derive(Debug, Clone)]
pub struct AuthenticatedContext {
    pub caller: CallerId,
    pub file_path_prefix: Option<PathBuf>,
}

impl AuthenticatedContext {
    pub fn file_path_prefix(&self) -> Option<&Path> {
        self.file_path_prefix.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn missing_user_is_unauthenticated() {
        let err = ExecutionContext::new().authenticate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn blank_user_is_unauthenticated() {
        let err = ExecutionContext::new().with_user("  ").authenticate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn authenticated_context_keeps_prefix_override() {
        let ctx = ExecutionContext::new()
            .with_user("1")
            .with_file_path_prefix("./user_files")
            .authenticate()
            .unwrap();

        assert_eq!(ctx.caller.as_str(), "1");
        assert_eq!(ctx.file_path_prefix(), Some(Path::new("./user_files")));
    }
}
