//! `datadrop` Core Library
//!
//! Shared functionality for `datadrop` components:
//! - Configuration resolution and hierarchy
//! - `SQLite` pool helpers and the `define_database!` macro
//! - Tracing subscriber setup
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
