//! Login session queries
//!
//! Sessions are keyed by the SHA-256 of the bearer token.

use chrono::{DateTime, Utc};
use mboard_common::Result;
use sqlx::SqliteExecutor;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub token_hash: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

pub async fn create_session<'e, E: SqliteExecutor<'e>>(
    db: E,
    token_hash: &str,
    user_id: &str,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(created_at)
    .bind(expires_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn get_session<'e, E: SqliteExecutor<'e>>(
    db: E,
    token_hash: &str,
) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT token_hash, user_id, created_at, expires_at FROM sessions WHERE token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(db)
    .await?;

    Ok(session)
}

/// Returns true if a session was removed
pub async fn delete_session<'e, E: SqliteExecutor<'e>>(db: E, token_hash: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(token_hash)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a user's expired sessions, returning how many were removed
pub async fn prune_expired<'e, E: SqliteExecutor<'e>>(
    db: E,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = ? AND expires_at <= ?")
        .bind(user_id)
        .bind(now)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}
