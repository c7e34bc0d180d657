//! Genre endpoints and the nested board read

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
use crate::services::edits::{self, GenreChanges};
use crate::services::{access, board, reorder};
use crate::AppState;

/// GET /api/genres
///
/// Every genre of the caller with missions and tasks nested, each level in
/// display order.
pub async fn list_genres(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<Value>> {
    let genres = board::load_board(&state.db, &identity.user.id).await?;
    Ok(Json(json!({ "genres": genres })))
}

/// POST /api/genres
pub async fn create_genre(
    State(state): State<AppState>,
    identity: Identity,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let payload = Payload::parse(&body)?;
    let name = payload.required_name()?;
    let summary = payload.summary()?.flatten();

    let genre =
        db::genres::create_genre(&state.db, &identity.user.id, &name, summary.as_deref()).await?;

    info!("Created genre {} for user {}", genre.id, identity.user.id);
    Ok(Json(json!({ "genre": genre })))
}

/// PATCH /api/genres/:id
pub async fn update_genre(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let genre = access::owned_genre(&state.db, &identity, &id).await?;

    let payload = Payload::parse(&body)?;
    let changes = GenreChanges {
        name: payload.name()?,
        summary: payload.summary()?,
    };

    let genre = edits::update_genre(&state.db, &genre, changes).await?;
    Ok(Json(json!({ "genre": genre })))
}

/// DELETE /api/genres/:id
pub async fn delete_genre(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let genre = access::owned_genre(&state.db, &identity, &id).await?;
    db::genres::delete_genre(&state.db, &genre.id).await?;

    info!("Deleted genre {}", genre.id);
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/genres/:id/move/:direction
pub async fn move_genre(
    State(state): State<AppState>,
    identity: Identity,
    Path((id, direction)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let direction: Direction = direction.parse()?;
    let genre = access::owned_genre(&state.db, &identity, &id).await?;

    reorder::move_genre(&state.db, &genre, direction).await?;
    Ok(Json(json!({ "ok": true })))
}
