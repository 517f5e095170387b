//! Configuration resolution for datadrop.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/datadrop/settings.json)
//! 3. Explicit config file (`--config` / `DATADROP_CONFIG`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Root under which versioned data files are staged when the caller does
/// not supply a prefix override.
pub const DEFAULT_FILE_PATH_PREFIX: &str = "/user_files";

/// Complete datadrop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,
}

/// Settings for the payload RPC host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub database_path: Option<PathBuf>,
    pub file_path_prefix: PathBuf,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            file_path_prefix: PathBuf::from(DEFAULT_FILE_PATH_PREFIX),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// On-disk layer. Only keys present in the file override earlier layers.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    rpc: RpcConfigFile,
}

#[derive(Debug, Default, Deserialize)]
struct RpcConfigFile {
    database_path: Option<PathBuf>,
    file_path_prefix: Option<PathBuf>,
    log_level: Option<String>,
    log_json: Option<bool>,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    // An explicitly named file must exist.
    if let Some(path) = explicit_path {
        let explicit = load_config_file(path)?;
        merge_config(&mut config, explicit);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("settings.json"))
}

/// Get the default database path for the RPC host.
pub fn database_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("datadrop.db"))
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".datadrop"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/datadrop"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("datadrop"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: ConfigFile) {
    let rpc = overlay.rpc;
    if rpc.database_path.is_some() {
        base.rpc.database_path = rpc.database_path;
    }
    if let Some(prefix) = rpc.file_path_prefix {
        base.rpc.file_path_prefix = prefix;
    }
    if let Some(level) = rpc.log_level {
        base.rpc.log_level = level;
    }
    if let Some(json) = rpc.log_json {
        base.rpc.log_json = json;
    }
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("DATADROP_DB_PATH") {
        config.rpc.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = var("DATADROP_FILE_PREFIX") {
        config.rpc.file_path_prefix = PathBuf::from(val);
    }
    if let Some(val) = var("DATADROP_LOG_LEVEL") {
        config.rpc.log_level = val;
    }
}
