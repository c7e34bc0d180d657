//! Accounts, sessions and request identity
//!
//! Protected routes sit behind [`auth_middleware`], which resolves the
//! `Authorization: Bearer <token>` header to a user and attaches an
//! [`Identity`] to the request. Handlers take `Identity` as an extractor.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Duration;
use mboard_common::api::auth::{
    generate_session_token, hash_password, hash_session_token, is_valid_email, normalize_email,
    verify_password, PasswordHashError, MIN_PASSWORD_LENGTH,
};
use mboard_common::db::User;
use mboard_common::time;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::payload::Payload;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    /// Hash of the session token this request authenticated with
    pub token_hash: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// PBKDF2 off the async workers
async fn hash_password_blocking(password: String, iterations: u32) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, iterations))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))
}

async fn verify_password_blocking(
    password: String,
    stored: String,
) -> ApiResult<Result<bool, PasswordHashError>> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(format!("Password check task failed: {}", e)))
}

/// Resolve the bearer token to a session and attach the caller's [`Identity`]
///
/// Missing, unknown and expired tokens are all 401. Expired sessions are
/// deleted on sight.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    let token_hash = bearer_token(&parts)
        .map(hash_session_token)
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let session = db::sessions::get_session(&state.db, &token_hash)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

    if session.is_expired(time::now()) {
        db::sessions::delete_session(&state.db, &token_hash).await?;
        warn!("Rejected expired session for user {}", session.user_id);
        return Err(ApiError::Unauthorized("Session expired".to_string()));
    }

    let user = db::users::get_user(&state.db, &session.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

    parts.extensions.insert(Identity { user, token_hash });

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// POST /api/auth/register
///
/// Body: `{email, password, name?}`
pub async fn register(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let payload = Payload::parse(&body)?;

    let email = normalize_email(payload.string("email")?.unwrap_or_default());
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("A valid email address is required".to_string()));
    }

    let password = payload.string("password")?.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let name = payload
        .string("name")?
        .map(str::trim)
        .filter(|name| !name.is_empty());

    if db::users::find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let password_hash =
        hash_password_blocking(password.to_string(), state.pbkdf2_iterations).await?;
    let user = db::users::create_user(&state.db, &email, name, &password_hash)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration
            mboard_common::Error::Conflict(_) => {
                ApiError::Conflict("Email is already registered".to_string())
            }
            other => other.into(),
        })?;

    info!("Registered user {}", user.id);
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/auth/login
///
/// Body: `{email, password}`. Returns a fresh bearer token.
pub async fn login(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let payload = Payload::parse(&body)?;
    let email = normalize_email(payload.string("email")?.unwrap_or_default());
    let password = payload.string("password")?.unwrap_or_default();

    let Some(user) = db::users::find_user_by_email(&state.db, &email).await? else {
        warn!("Login failed: unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let verified = verify_password_blocking(password.to_string(), user.password_hash.clone())
        .await?
        .map_err(|e| ApiError::Internal(format!("User {}: {}", user.id, e)))?;
    if !verified {
        warn!("Login failed for user {}: wrong password", user.id);
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let now = time::now();
    let expires_at = Duration::try_hours(state.session_ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            ApiError::Internal(format!("Session TTL out of range: {}h", state.session_ttl_hours))
        })?;
    let token = generate_session_token();

    let pruned = db::sessions::prune_expired(&state.db, &user.id, now).await?;
    db::sessions::create_session(&state.db, &hash_session_token(&token), &user.id, now, expires_at)
        .await?;

    info!("User {} logged in ({} expired sessions pruned)", user.id, pruned);
    Ok(Json(json!({
        "token": token,
        "expires_at": expires_at,
        "user": user,
    })))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<Value>> {
    db::sessions::delete_session(&state.db, &identity.token_hash).await?;
    info!("User {} logged out", identity.user.id);
    Ok(Json(json!({ "ok": true })))
}

/// GET /api/me
pub async fn me(identity: Identity) -> Json<Value> {
    Json(json!({ "user": identity.user }))
}
