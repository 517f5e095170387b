//! End-to-end payload processing.
//!
//! Stages run in a fixed order and the first failure ends the invocation:
//! authenticate, parse, resolve, read and digest, import, build. File I/O
//! finishes before a transaction is taken from the pool.

use std::path::PathBuf;

use datadrop_core::config::{DEFAULT_FILE_PATH_PREFIX, RpcConfig};
use tracing::{debug, info, warn};

use crate::context::ExecutionContext;
use crate::envelope::ResponseEnvelope;
use crate::error::{RpcError, RpcResult};
use crate::importer::ImportBatch;
use crate::payload::PayloadRequest;
use crate::reader::read_bundle;
use crate::resolver::resolve_file_path;
use crate::storage::Database;

/// Step of the processing pipeline, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticate,
    Parse,
    Resolve,
    Read,
    Import,
    Build,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::Parse => "parse",
            Self::Resolve => "resolve",
            Self::Read => "read",
            Self::Import => "import",
            Self::Build => "build",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processor settings.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Root used when the caller context has no prefix override.
    pub default_file_prefix: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            default_file_prefix: PathBuf::from(DEFAULT_FILE_PATH_PREFIX),
        }
    }
}

impl From<&RpcConfig> for ProcessorConfig {
    fn from(config: &RpcConfig) -> Self {
        Self {
            default_file_prefix: config.file_path_prefix.clone(),
        }
    }
}

/// Runs the payload RPC against a shared database pool.
///
/// Holds no per-request state, so one instance serves concurrent calls.
#[derive(Clone)]
pub struct PayloadProcessor {
    db: Database,
    config: ProcessorConfig,
}

impl PayloadProcessor {
    pub const fn new(db: Database, config: ProcessorConfig) -> Self {
        Self { db, config }
    }

    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Process one request and return the envelope.
    pub async fn process(
        &self,
        ctx: &ExecutionContext,
        payload: &str,
    ) -> RpcResult<ResponseEnvelope> {
        let ctx = ctx.authenticate().map_err(|e| failed(Stage::Authenticate, e))?;
        let request = PayloadRequest::parse(payload).map_err(|e| failed(Stage::Parse, e))?;
        debug!(
            caller = %ctx.caller,
            payload_type = %request.payload_type,
            version = %request.version,
            "Payload parsed"
        );

        let path = resolve_file_path(
            &ctx,
            &self.config.default_file_prefix,
            &request.payload_type,
            &request.version,
        )
        .map_err(|e| failed(Stage::Resolve, e))?;

        let bundle = read_bundle(&path).await.map_err(|e| failed(Stage::Read, e))?;

        let batch = ImportBatch::decode(&request.payload_type, &bundle.content)
            .map_err(|e| failed(Stage::Import, e))?;
        let summary = batch
            .apply(&self.db)
            .await
            .map_err(|e| failed(Stage::Import, e))?;
        info!(
            caller = %ctx.caller,
            payload_type = %summary.payload_type,
            records = summary.records,
            rows_affected = summary.rows_affected,
            "Import committed"
        );

        let envelope = ResponseEnvelope::build(&request, bundle);
        info!(
            caller = %ctx.caller,
            payload_type = %envelope.payload_type,
            version = %envelope.version,
            content_sent = envelope.content_sent(),
            "Payload processed"
        );
        Ok(envelope)
    }

    /// Process one request and return the serialized envelope.
    pub async fn process_rpc(&self, ctx: &ExecutionContext, payload: &str) -> RpcResult<String> {
        let envelope = self.process(ctx, payload).await?;
        envelope.to_json().map_err(|e| failed(Stage::Build, e))
    }
}

fn failed(stage: Stage, err: RpcError) -> RpcError {
    match &err {
        RpcError::FileNotFound {
            path,
            reason: Some(reason),
        } => warn!(%stage, code = err.code(), path = %path.display(), %reason, "Payload RPC failed"),
        _ => warn!(%stage, code = err.code(), error = %err, "Payload RPC failed"),
    }
    err
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::reader::digest_hex;

    const CORE_FILE: &str = "{\"data\": [{\"user_id\": 1, \"nickname\": \"roqueta\"}]}\n";

    struct Fixture {
        dir: tempfile::TempDir,
        processor: PayloadProcessor,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let db = Database::open_in_memory().await.unwrap();
            let config = ProcessorConfig {
                default_file_prefix: dir.path().to_path_buf(),
            };
            Self {
                dir,
                processor: PayloadProcessor::new(db, config),
            }
        }

        fn stage(&self, payload_type: &str, version: &str, content: &str) {
            let folder = self.dir.path().join(payload_type);
            std::fs::create_dir_all(&folder).unwrap();
            std::fs::write(folder.join(format!("{version}.json")), content).unwrap();
        }
    }

    fn caller() -> ExecutionContext {
        ExecutionContext::new().with_user("1")
    }

    #[tokio::test]
    async fn default_prefix_comes_from_config() {
        let fx = Fixture::new().await;
        fx.stage("core", "1.0.0", CORE_FILE);

        let hash = digest_hex(CORE_FILE.as_bytes());
        let envelope = fx
            .processor
            .process(&caller(), &format!(r#"{{"hash":"{hash}"}}"#))
            .await
            .unwrap();

        assert_eq!(envelope.content.as_deref(), Some(CORE_FILE));
        assert_eq!(fx.processor.database().get_core(1).await.unwrap().nickname, "roqueta");
    }

    #[tokio::test]
    async fn unauthenticated_caller_touches_nothing() {
        let fx = Fixture::new().await;
        fx.stage("core", "1.0.0", CORE_FILE);

        let err = fx
            .processor
            .process(&ExecutionContext::new(), "{}")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert!(fx.processor.database().list_core().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsupported_type_fails_after_read_without_mutation() {
        let fx = Fixture::new().await;
        fx.stage("inventory", "1.0.0", "{\"data\": []}");

        let err = fx
            .processor
            .process(&caller(), r#"{"type":"inventory"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    #[tokio::test]
    async fn missing_file_wins_over_unsupported_type() {
        let fx = Fixture::new().await;
        let err = fx
            .processor
            .process(&caller(), r#"{"type":"inventory"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[tokio::test]
    async fn array_payload_is_rejected_without_import() {
        let fx = Fixture::new().await;
        fx.stage("score", "1.0.0", "{\"data\": []}");

        let err = fx
            .processor
            .process(&caller(), r#"["score","1.0.0","H"]"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[tokio::test]
    async fn array_shaped_file_is_rejected_without_import() {
        let fx = Fixture::new().await;
        fx.stage("core", "1.0.0", r#"[[{"user_id": 1, "nickname": "a"}]]"#);

        let err = fx.processor.process(&caller(), "{}").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(fx.processor.database().list_core().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_file_content_fails() {
        let fx = Fixture::new().await;
        fx.stage("score", "1.0.0", "{\"data\": [");

        let err = fx
            .processor
            .process(&caller(), r#"{"type":"score"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn processor_config_follows_rpc_config() {
        let mut rpc = RpcConfig::default();
        rpc.file_path_prefix = PathBuf::from("/srv/files");
        assert_eq!(
            ProcessorConfig::from(&rpc).default_file_prefix,
            PathBuf::from("/srv/files")
        );
    }
}
