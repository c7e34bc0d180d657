//! Genre queries

use mboard_common::db::Genre;
use mboard_common::time;
use mboard_common::{Error, Result};
use sqlx::SqliteExecutor;
use uuid::Uuid;

const GENRE_COLUMNS: &str = "id, user_id, name, summary, sort_order, created_at";

/// All genres of a user, persisted order ascending
pub async fn list_genres<'e, E: SqliteExecutor<'e>>(db: E, user_id: &str) -> Result<Vec<Genre>> {
    let sql = format!(
        "SELECT {} FROM genres WHERE user_id = ? ORDER BY sort_order ASC, id ASC",
        GENRE_COLUMNS
    );
    let genres = sqlx::query_as::<_, Genre>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;

    Ok(genres)
}

pub async fn get_genre<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<Option<Genre>> {
    let sql = format!("SELECT {} FROM genres WHERE id = ?", GENRE_COLUMNS);
    let genre = sqlx::query_as::<_, Genre>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(genre)
}

/// Owning user of a genre, `None` if the genre does not exist
pub async fn genre_owner<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<Option<String>> {
    let owner = sqlx::query_scalar::<_, String>("SELECT user_id FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(owner)
}

/// Append a genre after its siblings (`order` = sibling count)
///
/// Count and insert are one statement, so concurrent creates cannot read the
/// same count half way.
pub async fn create_genre<'e, E: SqliteExecutor<'e>>(
    db: E,
    user_id: &str,
    name: &str,
    summary: Option<&str>,
) -> Result<Genre> {
    let id = Uuid::new_v4().to_string();

    let sql = format!(
        r#"
        INSERT INTO genres (id, user_id, name, summary, sort_order, created_at)
        SELECT ?, ?, ?, ?, COUNT(*), ? FROM genres WHERE user_id = ?
        RETURNING {}
        "#,
        GENRE_COLUMNS
    );
    let genre = sqlx::query_as::<_, Genre>(&sql)
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(summary)
        .bind(time::now())
        .bind(user_id)
        .fetch_one(db)
        .await?;

    Ok(genre)
}

/// Write back a genre's editable fields
pub async fn update_genre<'e, E: SqliteExecutor<'e>>(db: E, genre: &Genre) -> Result<()> {
    let result = sqlx::query("UPDATE genres SET name = ?, summary = ? WHERE id = ?")
        .bind(&genre.name)
        .bind(&genre.summary)
        .bind(&genre.id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Genre not found: {}", genre.id)));
    }

    Ok(())
}

/// Delete a genre; missions and tasks go with it
pub async fn delete_genre<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM genres WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Genre not found: {}", id)));
    }

    Ok(())
}
