//! Mission endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::payload::Payload;
use super::Identity;
use crate::db;
use crate::error::ApiResult;
use crate::ordering::Direction;
use crate::services::edits::{self, MissionChanges};
use crate::services::{access, reorder};
use crate::AppState;

/// POST /api/genres/:id/missions
pub async fn create_mission(
    State(state): State<AppState>,
    identity: Identity,
    Path(genre_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let genre = access::owned_genre(&state.db, &identity, &genre_id).await?;

    let payload = Payload::parse(&body)?;
    let name = payload.required_name()?;
    let summary = payload.summary()?.flatten();
    let due_date = payload.due_date().flatten();

    let mission = db::missions::create_mission(
        &state.db,
        &genre.id,
        &name,
        summary.as_deref(),
        due_date,
    )
    .await?;

    info!("Created mission {} in genre {}", mission.id, genre.id);
    Ok(Json(json!({ "mission": mission })))
}

/// PATCH /api/missions/:id
pub async fn update_mission(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let mission = access::owned_mission(&state.db, &identity, &id).await?;

    let payload = Payload::parse(&body)?;
    let changes = MissionChanges {
        name: payload.name()?,
        summary: payload.summary()?,
        due_date: payload.due_date(),
    };

    let mission = edits::update_mission(&state.db, &mission, changes).await?;
    Ok(Json(json!({ "mission": mission })))
}

/// DELETE /api/missions/:id
pub async fn delete_mission(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let mission = access::owned_mission(&state.db, &identity, &id).await?;
    db::missions::delete_mission(&state.db, &mission.id).await?;

    info!("Deleted mission {}", mission.id);
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/missions/:id/move/:direction
pub async fn move_mission(
    State(state): State<AppState>,
    identity: Identity,
    Path((id, direction)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let direction: Direction = direction.parse()?;
    let mission = access::owned_mission(&state.db, &identity, &id).await?;

    reorder::move_mission(&state.db, &mission, direction).await?;
    Ok(Json(json!({ "ok": true })))
}
