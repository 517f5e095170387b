//! datadrop RPC host
//!
//! Runs a single payload RPC invocation: the caller identity and optional
//! file prefix come from flags or the environment, the payload from an
//! argument or stdin. The serialized envelope is written to stdout.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use datadrop_core::config::{self, load_config};
use datadrop_core::tracing_init::{default_filter, init_tracing};
use datadrop_rpc::storage::Database;
use datadrop_rpc::{
    ExecutionContext, PayloadProcessor, ProcessorConfig, RPC_PROCESS_PAYLOAD, RpcRegistry,
    init_module,
};

#[derive(Parser, Debug)]
#[command(name = "datadrop-rpc")]
#[command(version, about = "datadrop - verify and import staged data files")]
struct Args {
    /// JSON config file, merged over the global settings
    #[arg(long, env = "DATADROP_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file path
    #[arg(long, env = "DATADROP_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Resolved caller identity
    #[arg(long, env = "DATADROP_USER_ID")]
    user_id: Option<String>,

    /// Per-call override of the data file root
    #[arg(long)]
    file_prefix: Option<PathBuf>,

    /// RPC id to invoke
    #[arg(long, default_value = RPC_PROCESS_PAYLOAD)]
    rpc: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,

    /// Request payload; read from stdin when omitted
    payload: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    init_tracing(
        &default_filter(env!("CARGO_PKG_NAME"), &config.rpc.log_level),
        args.log_json || config.rpc.log_json,
    );

    info!(version = env!("CARGO_PKG_VERSION"), rpc = %args.rpc, "Starting datadrop-rpc");

    let db_path = match args.db_path.or_else(|| config.rpc.database_path.clone()) {
        Some(path) => path,
        None => config::database_path().context("Cannot determine database path")?,
    };
    info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).await?;

    let processor = PayloadProcessor::new(db, ProcessorConfig::from(&config.rpc));
    let mut registry = RpcRegistry::new();
    init_module(&mut registry, processor)?;

    let payload = match args.payload {
        Some(payload) => payload,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read payload from stdin")?;
            buf
        }
    };

    let ctx = ExecutionContext {
        user_id: args.user_id,
        file_path_prefix: args.file_prefix,
    };

    match registry.invoke(&args.rpc, &ctx, &payload).await {
        Ok(response) => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{response}")?;
            Ok(())
        }
        Err(e) => {
            error!(code = e.code(), status = e.status_code(), error = %e, "RPC failed");
            std::process::exit(1);
        }
    }
}
