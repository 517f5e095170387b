//! `SQLite` storage for imported player data.
//!
//! Provides the `core` and `game_score` tables and their batch upserts.

mod db;
mod models;
mod queries;


pub use db::{Database, DatabaseError};
pub use models::*;
