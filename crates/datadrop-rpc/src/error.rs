//! Operation-level error outcomes for the payload RPC.

use std::path::PathBuf;

use datadrop_core::db::DatabaseError;
use thiserror::Error;

/// Result type alias for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthenticated,
    MalformedInput,
    FileNotFound,
    UnsupportedType,
    StoreFailure,
    RpcNotFound,
}

impl ErrorKind {
    /// Stable string code, safe to expose to callers.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::MalformedInput => "malformed_input",
            Self::FileNotFound => "file_not_found",
            Self::UnsupportedType => "unsupported_type",
            Self::StoreFailure => "store_failure",
            Self::RpcNotFound => "rpc_not_found",
        }
    }

    /// Numeric status following gRPC status code numbering.
    pub const fn status_code(self) -> i32 {
        match self {
            Self::Unauthenticated => 16,
            Self::MalformedInput | Self::UnsupportedType => 3,
            Self::FileNotFound => 5,
            Self::StoreFailure => 13,
            Self::RpcNotFound => 12,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A terminal failure of one RPC invocation.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("user not found")]
    Unauthenticated,

    #[error("input contained invalid data: {0}")]
    MalformedInput(String),

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf, reason: Option<String> },

    #[error("unsupported payload type: {0}")]
    UnsupportedType(String),

    #[error("store failure: {0}")]
    StoreFailure(String),

    #[error("rpc not found: {0}")]
    RpcNotFound(String),
}

impl RpcError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Self::StoreFailure(_) => ErrorKind::StoreFailure,
            Self::RpcNotFound(_) => ErrorKind::RpcNotFound,
        }
    }

    pub const fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub const fn status_code(&self) -> i32 {
        self.kind().status_code()
    }

    pub(crate) fn malformed(context: &str, err: impl std::fmt::Display) -> Self {
        Self::MalformedInput(format!("{context}: {err}"))
    }
}

impl From<DatabaseError> for RpcError {
    fn from(e: DatabaseError) -> Self {
        Self::StoreFailure(e.to_string())
    }
}

impl From<sqlx::Error> for RpcError {
    fn from(e: sqlx::Error) -> Self {
        DatabaseError::from(e).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(RpcError::Unauthenticated.code(), "unauthenticated");
        assert_eq!(RpcError::MalformedInput("x".into()).code(), "malformed_input");
        assert_eq!(
            RpcError::FileNotFound {
                path: PathBuf::from("/a"),
                reason: None
            }
            .code(),
            "file_not_found"
        );
        assert_eq!(RpcError::UnsupportedType("x".into()).code(), "unsupported_type");
        assert_eq!(RpcError::StoreFailure("x".into()).code(), "store_failure");
    }

    #[test]
    fn status_codes_follow_grpc_numbering() {
        assert_eq!(RpcError::Unauthenticated.status_code(), 16);
        assert_eq!(RpcError::UnsupportedType("x".into()).status_code(), 3);
        assert_eq!(RpcError::StoreFailure("x".into()).status_code(), 13);
        assert_eq!(RpcError::RpcNotFound("x".into()).status_code(), 12);
    }

    #[test]
    fn database_errors_become_store_failures() {
        let err: RpcError = DatabaseError::Query("constraint failed".into()).into();
        assert_eq!(err.kind(), ErrorKind::StoreFailure);
        assert!(err.to_string().contains("constraint failed"));
    }
}
