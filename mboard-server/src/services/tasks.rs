//! Task mutations that keep the parent mission's completion in step
//!
//! Creating, editing or deleting a task changes the task set its mission's
//! `completed_at` derives from, so each runs in one transaction together with
//! the mission refresh.

use crate::db;
use crate::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use mboard_common::db::Task;
use mboard_common::time;
use sqlx::SqlitePool;
use tracing::info;

/// Field changes for a task; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the due date
    pub due_date: Option<Option<NaiveDate>>,
    pub done: Option<bool>,
}

impl TaskChanges {
    /// Apply to a task, stamping or clearing `completed_at` on a done transition
    fn apply(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(done) = self.done {
            if done && !task.done {
                task.completed_at = Some(time::now());
            } else if !done {
                task.completed_at = None;
            }
            task.done = done;
        }
    }
}

pub async fn add_task(
    db: &SqlitePool,
    mission_id: &str,
    name: &str,
    due_date: Option<NaiveDate>,
) -> ApiResult<Task> {
    let mut tx = db.begin().await?;

    let task = db::tasks::create_task(&mut *tx, mission_id, name, due_date).await?;
    // A new open task reopens a completed mission
    db::missions::refresh_completion(&mut tx, mission_id, time::now()).await?;

    tx.commit().await?;

    info!("Created task {} in mission {}", task.id, mission_id);
    Ok(task)
}

pub async fn update_task(db: &SqlitePool, task: &Task, changes: TaskChanges) -> ApiResult<Task> {
    let mut tx = db.begin().await?;
    db::TASKS.lock_group(&mut tx, &task.mission_id).await?;

    // Re-read under the lock so the done transition is judged on committed state
    let mut current = db::tasks::get_task(&mut *tx, &task.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", task.id)))?;

    let was_done = current.done;
    changes.apply(&mut current);
    db::tasks::update_task(&mut *tx, &current).await?;

    if current.done != was_done {
        let completed_at =
            db::missions::refresh_completion(&mut tx, &current.mission_id, time::now()).await?;
        info!(
            "Task {} done={} (mission {} completed_at={:?})",
            current.id, current.done, current.mission_id, completed_at
        );
    }

    tx.commit().await?;

    Ok(current)
}

pub async fn remove_task(db: &SqlitePool, task: &Task) -> ApiResult<()> {
    let mut tx = db.begin().await?;

    db::tasks::delete_task(&mut *tx, &task.id).await?;
    db::missions::refresh_completion(&mut tx, &task.mission_id, time::now()).await?;

    tx.commit().await?;

    info!("Deleted task {}", task.id);
    Ok(())
}
