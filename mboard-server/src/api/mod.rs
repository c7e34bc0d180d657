//! HTTP API handlers

pub mod auth;
pub mod genres;
pub mod health;
pub mod missions;
pub mod payload;
pub mod tasks;

pub use auth::{auth_middleware, Identity};
pub use health::health_routes;
