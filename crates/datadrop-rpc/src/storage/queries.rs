//! Batch upserts and lookups for imported records.

use sqlx::{Sqlite, Transaction};

use super::db::{Database, DatabaseError};
use super::models::{CoreRecord, ScoreRecord};

const UPSERT_CORE_SQL: &str = "INSERT INTO core (user_id, nickname) VALUES (?, ?) \
     ON CONFLICT (user_id) DO UPDATE SET nickname = excluded.nickname";

const UPSERT_GAME_SCORE_SQL: &str = "INSERT INTO game_score (user_id, game_id, score) VALUES (?, ?, ?) \
     ON CONFLICT (user_id, game_id) DO UPDATE SET score = excluded.score";

impl Database {
    // =========================================================================
    // Batch upserts
    // =========================================================================

    /// Upsert every core record in one transaction.
    ///
    /// Records apply in order, so a later duplicate `user_id` wins. Nothing
    /// is persisted unless every record succeeds.
    pub async fn upsert_core_batch(&self, records: &[CoreRecord]) -> Result<u64, DatabaseError> {
        let mut tx = self.pool().begin().await?;
        let mut affected = 0;

        for record in records {
            affected += sqlx::query(UPSERT_CORE_SQL)
                .bind(record.user_id)
                .bind(record.nickname.as_str())
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        commit(tx).await?;
        Ok(affected)
    }

    /// Upsert every score record in one transaction.
    ///
    /// Same ordering and atomicity rules as [`Database::upsert_core_batch`].
    pub async fn upsert_score_batch(&self, records: &[ScoreRecord]) -> Result<u64, DatabaseError> {
        let mut tx = self.pool().begin().await?;
        let mut affected = 0;

        for record in records {
            affected += sqlx::query(UPSERT_GAME_SCORE_SQL)
                .bind(record.user_id)
                .bind(record.game_id)
                .bind(record.score)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        commit(tx).await?;
        Ok(affected)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Get the core record for a user.
    pub async fn get_core(&self, user_id: i64) -> Result<CoreRecord, DatabaseError> {
        sqlx::query_as::<_, CoreRecord>("SELECT user_id, nickname FROM core WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Core record for user {user_id}")))
    }

    /// Get the score a user holds in a game.
    pub async fn get_score(&self, user_id: i64, game_id: i64) -> Result<ScoreRecord, DatabaseError> {
        sqlx::query_as::<_, ScoreRecord>(
            "SELECT user_id, game_id, score FROM game_score WHERE user_id = ? AND game_id = ?",
        )
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| {
            DatabaseError::NotFound(format!("Score for user {user_id} in game {game_id}"))
        })
    }

    /// List all core records ordered by user.
    pub async fn list_core(&self) -> Result<Vec<CoreRecord>, DatabaseError> {
        let rows = sqlx::query_as::<_, CoreRecord>(
            "SELECT user_id, nickname FROM core ORDER BY user_id",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// List all scores ordered by user, then game.
    pub async fn list_scores(&self) -> Result<Vec<ScoreRecord>, DatabaseError> {
        let rows = sqlx::query_as::<_, ScoreRecord>(
            "SELECT user_id, game_id, score FROM game_score ORDER BY user_id, game_id",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}

/// Any early return before this point drops `tx`, which rolls it back.
async fn commit(tx: Transaction<'_, Sqlite>) -> Result<(), DatabaseError> {
    tx.commit().await?;
    Ok(())
}
