//! Task endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use super::payload::Payload;
use super::Identity;
use crate::error::ApiResult;
use crate::ordering::Direction;
use crate::services::tasks::{self as task_service, TaskChanges};
use crate::services::{access, reorder};
use crate::AppState;

/// POST /api/missions/:id/tasks
pub async fn create_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(mission_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let mission = access::owned_mission(&state.db, &identity, &mission_id).await?;

    let payload = Payload::parse(&body)?;
    let name = payload.required_name()?;
    let due_date = payload.due_date().flatten();

    let task = task_service::add_task(&state.db, &mission.id, &name, due_date).await?;
    Ok(Json(json!({ "task": task })))
}

/// PATCH /api/tasks/:id
///
/// Body: `{name?, due_date?, done?}`. Toggling `done` updates the parent
/// mission's completion in the same transaction.
pub async fn update_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let task = access::owned_task(&state.db, &identity, &id).await?;

    let payload = Payload::parse(&body)?;
    let changes = TaskChanges {
        name: payload.name()?,
        due_date: payload.due_date(),
        done: payload.done()?,
    };

    let task = task_service::update_task(&state.db, &task, changes).await?;
    Ok(Json(json!({ "task": task })))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let task = access::owned_task(&state.db, &identity, &id).await?;
    task_service::remove_task(&state.db, &task).await?;
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/tasks/:id/move/:direction
pub async fn move_task(
    State(state): State<AppState>,
    identity: Identity,
    Path((id, direction)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let direction: Direction = direction.parse()?;
    let task = access::owned_task(&state.db, &identity, &id).await?;

    reorder::move_task(&state.db, &task, direction).await?;
    Ok(Json(json!({ "ok": true })))
}
