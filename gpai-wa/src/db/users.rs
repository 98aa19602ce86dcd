//! User identity lookup and registration
//!
//! Identities are keyed by WhatsApp address. The `ocr_data` column is a
//! raw-payload audit buffer written by the extraction worker and cleared
//! when the user resolves the confirmation; the authoritative candidate
//! list lives in the conversation state.

use chrono::Utc;
use gpai_common::models::User;
use gpai_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Look up a registered user by WhatsApp address.
pub async fn find_by_phone(db: &SqlitePool, phone_number: &str) -> Result<Option<User>> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, phone_number, created_at FROM users WHERE phone_number = ?")
            .bind(phone_number)
            .fetch_optional(db)
            .await?;

    row.map(|(id, phone_number, created_at)| {
        Ok(User {
            id: parse_uuid(&id)?,
            phone_number,
            created_at: parse_timestamp(&created_at)?,
        })
    })
    .transpose()
}

/// Register a new user for this address.
pub async fn create(db: &SqlitePool, phone_number: &str) -> Result<User> {
    let user = User {
        id: Uuid::new_v4(),
        phone_number: phone_number.to_string(),
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO users (id, phone_number, created_at) VALUES (?, ?, ?)")
        .bind(user.id.to_string())
        .bind(&user.phone_number)
        .bind(user.created_at.to_rfc3339())
        .execute(db)
        .await?;
    Ok(user)
}

/// Store the raw extraction payload for later inspection.
pub async fn set_ocr_buffer(db: &SqlitePool, user_id: Uuid, payload: &str) -> Result<()> {
    sqlx::query("UPDATE users SET ocr_data = ? WHERE id = ?")
        .bind(payload)
        .bind(user_id.to_string())
        .execute(db)
        .await?;
    Ok(())
}

/// Drop the extraction payload once the confirmation is resolved.
pub async fn clear_ocr_buffer(db: &SqlitePool, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE users SET ocr_data = NULL WHERE id = ?")
        .bind(user_id.to_string())
        .execute(db)
        .await?;
    Ok(())
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("bad uuid in users table: {}", e)))
}

fn parse_timestamp(raw: &str) -> Result<chrono::DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("bad timestamp in users table: {}", e)))
}
