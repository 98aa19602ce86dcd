//! Durable conversation state, keyed by user
//!
//! Every webhook invocation is a fresh load-compute-store cycle; nothing
//! is held in process memory between messages. Writes are conditional on
//! a version column so two invocations for the same user cannot both
//! apply against the same stale state: the loser retries.

use chrono::Utc;
use gpai_common::models::ConversationState;
use gpai_common::Result;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct StateStore {
    db: SqlitePool,
}

impl StateStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Load the user's conversation state and its version.
    ///
    /// A missing row is `Idle` at version 0. An unreadable payload is
    /// reset to `Idle` at its stored version, never propagated.
    pub async fn load(&self, user_id: Uuid) -> Result<(ConversationState, i64)> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT state, version FROM conversation_state WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_optional(&self.db)
                .await?;

        match row {
            None => Ok((ConversationState::Idle, 0)),
            Some((payload, version)) => match serde_json::from_str(&payload) {
                Ok(state) => Ok((state, version)),
                Err(e) => {
                    warn!(%user_id, "Corrupt conversation state, resetting to Idle: {}", e);
                    Ok((ConversationState::Idle, version))
                }
            },
        }
    }

    /// Write the state only if the stored version still matches.
    ///
    /// Returns false when another invocation got there first; the caller
    /// reloads and recomputes its transition.
    pub async fn save_if_version(
        &self,
        user_id: Uuid,
        state: &ConversationState,
        expected_version: i64,
    ) -> Result<bool> {
        let payload = serde_json::to_string(state)
            .map_err(|e| gpai_common::Error::Internal(format!("serialize state: {}", e)))?;
        let now = Utc::now().to_rfc3339();

        let rows = if expected_version == 0 {
            // No row yet: the insert itself is the conditional write
            sqlx::query(
                "INSERT OR IGNORE INTO conversation_state (user_id, state, version, updated_at)
                 VALUES (?, ?, 1, ?)",
            )
            .bind(user_id.to_string())
            .bind(&payload)
            .bind(&now)
            .execute(&self.db)
            .await?
            .rows_affected()
        } else {
            sqlx::query(
                "UPDATE conversation_state
                 SET state = ?, version = version + 1, updated_at = ?
                 WHERE user_id = ? AND version = ?",
            )
            .bind(&payload)
            .bind(&now)
            .bind(user_id.to_string())
            .bind(expected_version)
            .execute(&self.db)
            .await?
            .rows_affected()
        };

        Ok(rows == 1)
    }

    /// Unconditional write (last-writer-wins). Used to roll a reserved
    /// transition back when the commit behind it failed.
    pub async fn save(&self, user_id: Uuid, state: &ConversationState) -> Result<()> {
        let payload = serde_json::to_string(state)
            .map_err(|e| gpai_common::Error::Internal(format!("serialize state: {}", e)))?;
        sqlx::query(
            "INSERT INTO conversation_state (user_id, state, version, updated_at)
             VALUES (?, ?, 1, ?)
             ON CONFLICT(user_id) DO UPDATE
             SET state = excluded.state, version = version + 1, updated_at = excluded.updated_at",
        )
        .bind(user_id.to_string())
        .bind(&payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
