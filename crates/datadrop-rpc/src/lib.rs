//! datadrop payload RPC
//!
//! Serves one operation: given a `{type, version, hash}` request, locate the
//! staged `<prefix>/<type>/<version>.json` file, digest it, upsert its
//! records into `SQLite`, and answer with an envelope that carries the
//! file content only when the caller's hash matches.
//!
//! - Caller context and identity gate
//! - Payload parsing with defaults
//! - Path resolution and integrity reading
//! - Typed, transactional record import
//! - Response envelope and RPC registry

pub mod context;
pub mod envelope;
pub mod error;
pub mod importer;
pub mod payload;
pub mod processor;
pub mod reader;
pub mod registry;
pub mod resolver;
pub mod storage;

pub use context::{AuthenticatedContext, CallerId, ExecutionContext};
pub use envelope::ResponseEnvelope;
pub use error::{ErrorKind, RpcError, RpcResult};
pub use processor::{PayloadProcessor, ProcessorConfig};
pub use registry::{RPC_PROCESS_PAYLOAD, RpcRegistry, init_module};
