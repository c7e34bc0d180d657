//! Ownership checks
//!
//! Every entity resolves to a user through Task → Mission → Genre → User.
//! A missing entity is 404; one owned by someone else is 403.

use crate::api::Identity;
use crate::db;
use crate::error::{ApiError, ApiResult};
use mboard_common::db::{Genre, Mission, Task};
use sqlx::SqlitePool;
use tracing::warn;

fn check_owner(kind: &str, id: &str, owner: Option<String>, identity: &Identity) -> ApiResult<()> {
    match owner {
        None => Err(ApiError::NotFound(format!("{} not found: {}", kind, id))),
        Some(owner) if owner == identity.user.id => Ok(()),
        Some(_) => {
            warn!("User {} denied access to {} {}", identity.user.id, kind, id);
            Err(ApiError::Forbidden(format!("{} belongs to another user", kind)))
        }
    }
}

pub async fn owned_genre(db: &SqlitePool, identity: &Identity, id: &str) -> ApiResult<Genre> {
    check_owner("Genre", id, db::genres::genre_owner(db, id).await?, identity)?;
    db::genres::get_genre(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Genre not found: {}", id)))
}

pub async fn owned_mission(db: &SqlitePool, identity: &Identity, id: &str) -> ApiResult<Mission> {
    check_owner("Mission", id, db::missions::mission_owner(db, id).await?, identity)?;
    db::missions::get_mission(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Mission not found: {}", id)))
}

pub async fn owned_task(db: &SqlitePool, identity: &Identity, id: &str) -> ApiResult<Task> {
    check_owner("Task", id, db::tasks::task_owner(db, id).await?, identity)?;
    db::tasks::get_task(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", id)))
}
