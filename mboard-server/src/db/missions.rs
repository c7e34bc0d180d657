//! Mission queries

use chrono::{DateTime, NaiveDate, Utc};
use mboard_common::db::Mission;
use mboard_common::time;
use mboard_common::{Error, Result};
use sqlx::{SqliteConnection, SqliteExecutor};
use uuid::Uuid;

const MISSION_COLUMNS: &str =
    "id, genre_id, name, summary, due_date, completed_at, sort_order, created_at";

/// A mission together with the task counts its completion state derives from
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MissionProgress {
    #[sqlx(flatten)]
    pub mission: Mission,
    pub task_count: i64,
    pub done_count: i64,
}

/// All missions of a genre with task counts, persisted order ascending
pub async fn list_missions<'e, E: SqliteExecutor<'e>>(
    db: E,
    genre_id: &str,
) -> Result<Vec<MissionProgress>> {
    let missions = sqlx::query_as::<_, MissionProgress>(
        r#"
        SELECT m.id, m.genre_id, m.name, m.summary, m.due_date, m.completed_at,
               m.sort_order, m.created_at,
               COUNT(t.id) AS task_count,
               COALESCE(SUM(t.done), 0) AS done_count
        FROM missions m
        LEFT JOIN tasks t ON t.mission_id = m.id
        WHERE m.genre_id = ?
        GROUP BY m.id
        ORDER BY m.sort_order ASC, m.id ASC
        "#,
    )
    .bind(genre_id)
    .fetch_all(db)
    .await?;

    Ok(missions)
}

/// Every mission under any of a user's genres
pub async fn list_missions_for_user<'e, E: SqliteExecutor<'e>>(
    db: E,
    user_id: &str,
) -> Result<Vec<Mission>> {
    let missions = sqlx::query_as::<_, Mission>(
        r#"
        SELECT m.id, m.genre_id, m.name, m.summary, m.due_date, m.completed_at,
               m.sort_order, m.created_at
        FROM missions m
        JOIN genres g ON g.id = m.genre_id
        WHERE g.user_id = ?
        ORDER BY m.sort_order ASC, m.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(missions)
}

pub async fn get_mission<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<Option<Mission>> {
    let sql = format!("SELECT {} FROM missions WHERE id = ?", MISSION_COLUMNS);
    let mission = sqlx::query_as::<_, Mission>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(mission)
}

/// Owning user of a mission (through its genre), `None` if the mission does not exist
pub async fn mission_owner<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<Option<String>> {
    let owner = sqlx::query_scalar::<_, String>(
        "SELECT g.user_id FROM missions m JOIN genres g ON g.id = m.genre_id WHERE m.id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(owner)
}

/// Append a mission after its siblings (`order` = sibling count)
pub async fn create_mission<'e, E: SqliteExecutor<'e>>(
    db: E,
    genre_id: &str,
    name: &str,
    summary: Option<&str>,
    due_date: Option<NaiveDate>,
) -> Result<Mission> {
    let id = Uuid::new_v4().to_string();

    let sql = format!(
        r#"
        INSERT INTO missions (id, genre_id, name, summary, due_date, completed_at, sort_order, created_at)
        SELECT ?, ?, ?, ?, ?, NULL, COUNT(*), ? FROM missions WHERE genre_id = ?
        RETURNING {}
        "#,
        MISSION_COLUMNS
    );
    let mission = sqlx::query_as::<_, Mission>(&sql)
        .bind(&id)
        .bind(genre_id)
        .bind(name)
        .bind(summary)
        .bind(due_date)
        .bind(time::now())
        .bind(genre_id)
        .fetch_one(db)
        .await?;

    Ok(mission)
}

/// Write back a mission's editable fields
pub async fn update_mission<'e, E: SqliteExecutor<'e>>(db: E, mission: &Mission) -> Result<()> {
    let result = sqlx::query("UPDATE missions SET name = ?, summary = ?, due_date = ? WHERE id = ?")
        .bind(&mission.name)
        .bind(&mission.summary)
        .bind(mission.due_date)
        .bind(&mission.id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Mission not found: {}", mission.id)));
    }

    Ok(())
}

/// Delete a mission; its tasks go with it
pub async fn delete_mission<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM missions WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Mission not found: {}", id)));
    }

    Ok(())
}

/// Recompute a mission's `completed_at` from its current task set
///
/// Non-empty and all done: set to `now` unless already set. Anything else:
/// cleared. Run it inside the transaction that changed the tasks so the count
/// and the write see the same state.
pub async fn refresh_completion(
    conn: &mut SqliteConnection,
    mission_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    let (task_count, done_count): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(done), 0) FROM tasks WHERE mission_id = ?",
    )
    .bind(mission_id)
    .fetch_one(&mut *conn)
    .await?;

    let complete = task_count > 0 && done_count >= task_count;

    let completed_at = if complete {
        sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "UPDATE missions SET completed_at = COALESCE(completed_at, ?) WHERE id = ? RETURNING completed_at",
        )
        .bind(now)
        .bind(mission_id)
        .fetch_optional(&mut *conn)
        .await?
        .flatten()
    } else {
        sqlx::query("UPDATE missions SET completed_at = NULL WHERE id = ?")
            .bind(mission_id)
            .execute(&mut *conn)
            .await?;
        None
    };

    Ok(completed_at)
}
