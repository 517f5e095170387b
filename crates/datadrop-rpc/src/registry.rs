//! In-process RPC registration and dispatch.
//!
//! The host looks RPCs up by id and hands over an execution context plus the
//! raw payload.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use datadrop_core::Error as CoreError;
use tracing::{debug, info};

use crate::context::ExecutionContext;
use crate::error::{RpcError, RpcResult};
use crate::processor::PayloadProcessor;

/// Id under which the payload RPC is registered.
pub const RPC_PROCESS_PAYLOAD: &str = "ProcessPayloadRpc";

/// Boxed future returned by RPC handlers.
pub type RpcFuture<'a> = Pin<Box<dyn Future<Output = RpcResult<String>> + Send + 'a>>;

/// A registered RPC.
pub trait RpcHandler: Send + Sync {
    fn call<'a>(&'a self, ctx: &'a ExecutionContext, payload: &'a str) -> RpcFuture<'a>;
}

impl RpcHandler for PayloadProcessor {
    fn call<'a>(&'a self, ctx: &'a ExecutionContext, payload: &'a str) -> RpcFuture<'a> {
        Box::pin(self.process_rpc(ctx, payload))
    }
}

/// RPC handlers by id.
#[derive(Default, Clone)]
pub struct RpcRegistry {
    handlers: HashMap<String, Arc<dyn RpcHandler>>,
}

impl RpcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `id`. Ids must be unique.
    pub fn register(
        &mut self,
        id: &str,
        handler: Arc<dyn RpcHandler>,
    ) -> Result<(), CoreError> {
        if self.handlers.contains_key(id) {
            return Err(CoreError::Config(format!("RPC {id} is already registered")));
        }
        self.handlers.insert(id.to_string(), handler);
        debug!(rpc = id, "RPC registered");
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Dispatch `payload` to the RPC registered under `id`.
    pub async fn invoke(
        &self,
        id: &str,
        ctx: &ExecutionContext,
        payload: &str,
    ) -> RpcResult<String> {
        let handler = self
            .handlers
            .get(id)
            .ok_or_else(|| RpcError::RpcNotFound(id.to_string()))?;
        handler.call(ctx, payload).await
    }
}

/// Register every RPC this crate provides.
pub fn init_module(
    registry: &mut RpcRegistry,
    processor: PayloadProcessor,
) -> Result<(), CoreError> {
    let started = Instant::now();

    registry.register(RPC_PROCESS_PAYLOAD, Arc::new(processor))?;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(elapsed_ms, "Plugin loaded");
    Ok(())
}
