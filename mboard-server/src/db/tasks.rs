//! Task queries

use chrono::NaiveDate;
use mboard_common::db::Task;
use mboard_common::time;
use mboard_common::{Error, Result};
use sqlx::SqliteExecutor;
use uuid::Uuid;

const TASK_COLUMNS: &str =
    "id, mission_id, name, due_date, done, completed_at, sort_order, created_at";

/// All tasks of a mission, persisted order ascending
pub async fn list_tasks<'e, E: SqliteExecutor<'e>>(db: E, mission_id: &str) -> Result<Vec<Task>> {
    let sql = format!(
        "SELECT {} FROM tasks WHERE mission_id = ? ORDER BY sort_order ASC, id ASC",
        TASK_COLUMNS
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(mission_id)
        .fetch_all(db)
        .await?;

    Ok(tasks)
}

/// Every task under any of a user's genres
pub async fn list_tasks_for_user<'e, E: SqliteExecutor<'e>>(
    db: E,
    user_id: &str,
) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT t.id, t.mission_id, t.name, t.due_date, t.done, t.completed_at,
               t.sort_order, t.created_at
        FROM tasks t
        JOIN missions m ON m.id = t.mission_id
        JOIN genres g ON g.id = m.genre_id
        WHERE g.user_id = ?
        ORDER BY t.sort_order ASC, t.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(tasks)
}

pub async fn get_task<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS);
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(task)
}

/// Owning user of a task (through mission and genre), `None` if the task does not exist
pub async fn task_owner<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<Option<String>> {
    let owner = sqlx::query_scalar::<_, String>(
        r#"
        SELECT g.user_id
        FROM tasks t
        JOIN missions m ON m.id = t.mission_id
        JOIN genres g ON g.id = m.genre_id
        WHERE t.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(owner)
}

/// Append a task after its siblings (`order` = sibling count), not done
pub async fn create_task<'e, E: SqliteExecutor<'e>>(
    db: E,
    mission_id: &str,
    name: &str,
    due_date: Option<NaiveDate>,
) -> Result<Task> {
    let id = Uuid::new_v4().to_string();

    let sql = format!(
        r#"
        INSERT INTO tasks (id, mission_id, name, due_date, done, completed_at, sort_order, created_at)
        SELECT ?, ?, ?, ?, 0, NULL, COUNT(*), ? FROM tasks WHERE mission_id = ?
        RETURNING {}
        "#,
        TASK_COLUMNS
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(&id)
        .bind(mission_id)
        .bind(name)
        .bind(due_date)
        .bind(time::now())
        .bind(mission_id)
        .fetch_one(db)
        .await?;

    Ok(task)
}

/// Write back a task's editable fields, including its done state
pub async fn update_task<'e, E: SqliteExecutor<'e>>(db: E, task: &Task) -> Result<()> {
    let result = sqlx::query(
        "UPDATE tasks SET name = ?, due_date = ?, done = ?, completed_at = ? WHERE id = ?",
    )
    .bind(&task.name)
    .bind(task.due_date)
    .bind(task.done)
    .bind(task.completed_at)
    .bind(&task.id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Task not found: {}", task.id)));
    }

    Ok(())
}

pub async fn delete_task<'e, E: SqliteExecutor<'e>>(db: E, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Task not found: {}", id)));
    }

    Ok(())
}
