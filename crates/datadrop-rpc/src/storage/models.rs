//! Record types shared by the file decoder and the storage layer.

use serde::{Deserialize, Serialize};

/// Player profile row. Keyed by `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CoreRecord {
    pub user_id: i64,
    pub nickname: String,
}

/// Per-game score row. Keyed by `(user_id, game_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoreRecord {
    pub user_id: i64,
    pub game_id: i64,
    pub score: i64,
}
