//! Manual move up/down for each level
//!
//! Each move is one transaction: lock the sibling group, read and display-sort
//! the siblings, plan the move, write only the orders that changed. A failed
//! plan or write rolls everything back.

use crate::db::{self, SiblingTable};
use crate::error::ApiResult;
use crate::ordering::{plan_move, sort_for_display, Direction, MovePlan};
use mboard_common::db::{Genre, Mission, Task};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

pub async fn move_genre(db: &SqlitePool, genre: &Genre, direction: Direction) -> ApiResult<MovePlan> {
    let mut tx = db.begin().await?;
    db::GENRES.lock_group(&mut tx, &genre.user_id).await?;

    let mut siblings = db::genres::list_genres(&mut *tx, &genre.user_id).await?;
    sort_for_display(&mut siblings);

    let plan = plan_move(&siblings, &genre.id, direction)?;
    apply_plan(&mut tx, db::GENRES, &plan).await?;
    tx.commit().await?;

    info!("Moved genre {} {:?}", genre.id, direction);
    Ok(plan)
}

pub async fn move_mission(
    db: &SqlitePool,
    mission: &Mission,
    direction: Direction,
) -> ApiResult<MovePlan> {
    let mut tx = db.begin().await?;
    db::MISSIONS.lock_group(&mut tx, &mission.genre_id).await?;

    let mut siblings = db::missions::list_missions(&mut *tx, &mission.genre_id).await?;
    sort_for_display(&mut siblings);

    let plan = plan_move(&siblings, &mission.id, direction)?;
    apply_plan(&mut tx, db::MISSIONS, &plan).await?;
    tx.commit().await?;

    info!("Moved mission {} {:?}", mission.id, direction);
    Ok(plan)
}

pub async fn move_task(db: &SqlitePool, task: &Task, direction: Direction) -> ApiResult<MovePlan> {
    let mut tx = db.begin().await?;
    db::TASKS.lock_group(&mut tx, &task.mission_id).await?;

    let mut siblings = db::tasks::list_tasks(&mut *tx, &task.mission_id).await?;
    sort_for_display(&mut siblings);

    let plan = plan_move(&siblings, &task.id, direction)?;
    apply_plan(&mut tx, db::TASKS, &plan).await?;
    tx.commit().await?;

    info!("Moved task {} {:?}", task.id, direction);
    Ok(plan)
}

async fn apply_plan(
    conn: &mut SqliteConnection,
    table: SiblingTable,
    plan: &MovePlan,
) -> ApiResult<()> {
    for update in plan.changed() {
        debug!(
            "{}: {} order {} -> {}",
            table.table, update.id, update.old_order, update.new_order
        );
        table.set_order(conn, &update.id, update.new_order).await?;
    }
    Ok(())
}
