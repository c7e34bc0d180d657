//! User account queries

use mboard_common::db::User;
use mboard_common::time;
use mboard_common::{Error, Result};
use sqlx::SqliteExecutor;
use uuid::Uuid;

/// Insert a new user
///
/// A duplicate email surfaces as [`Error::Conflict`] so callers can map it
/// to a conflict without inspecting driver errors.
pub async fn create_user<'e, E: SqliteExecutor<'e>>(
    db: E,
    email: &str,
    name: Option<&str>,
    password_hash: &str,
) -> Result<User> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: name.map(str::to_string),
        password_hash: password_hash.to_string(),
        created_at: time::now(),
    };

    let result = sqlx::query(
        "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(user),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(
            format!("Email already registered: {}", email),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn find_user_by_email<'e, E: SqliteExecutor<'e>>(
    db: E,
    email: &str,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    Ok(user)
}

pub async fn get_user<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, name, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(user)
}
