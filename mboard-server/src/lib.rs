//! mboard-server library
//!
//! HTTP service for the Genre → Mission → Task board: axum router, handlers,
//! entity queries and the sibling ordering engine.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod ordering;
pub mod services;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Lifetime of a new login session
    pub session_ttl_hours: i64,
    /// PBKDF2 cost for newly registered passwords
    pub pbkdf2_iterations: u32,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, session_ttl_hours: i64, pbkdf2_iterations: u32) -> Self {
        Self {
            db,
            session_ttl_hours,
            pbkdf2_iterations,
        }
    }
}

/// Build application router
///
/// Everything except health, register and login requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, patch, post};

    // Protected routes (require a session)
    let protected = Router::new()
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/me", get(api::auth::me))
        .route(
            "/api/genres",
            get(api::genres::list_genres).post(api::genres::create_genre),
        )
        .route(
            "/api/genres/:id",
            patch(api::genres::update_genre).delete(api::genres::delete_genre),
        )
        .route("/api/genres/:id/move/:direction", post(api::genres::move_genre))
        .route("/api/genres/:id/missions", post(api::missions::create_mission))
        .route(
            "/api/missions/:id",
            patch(api::missions::update_mission).delete(api::missions::delete_mission),
        )
        .route(
            "/api/missions/:id/move/:direction",
            post(api::missions::move_mission),
        )
        .route("/api/missions/:id/tasks", post(api::tasks::create_task))
        .route(
            "/api/tasks/:id",
            patch(api::tasks::update_task).delete(api::tasks::delete_task),
        )
        .route("/api/tasks/:id/move/:direction", post(api::tasks::move_task))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
