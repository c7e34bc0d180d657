//! Shared helpers for the API integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use mboard_common::db::init_memory_database;
use mboard_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

pub const PASSWORD: &str = "correct horse battery";

/// Test helper: app over a fresh in-memory database, with cheap password hashing
pub async fn setup_app() -> (Router, SqlitePool) {
    let db = init_memory_database()
        .await
        .expect("Should create in-memory database");
    let state = AppState::new(db.clone(), 24, 10);
    (build_router(state), db)
}

/// Test helper: build a request with optional bearer token and JSON body
pub fn test_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

/// Test helper: extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: send a request and return status plus parsed JSON body
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(test_request(method, uri, token, body))
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

/// Test helper: register an account and log in, returning the bearer token
pub async fn login_as(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {}", email);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {}", email);
    body["token"].as_str().unwrap().to_string()
}

pub async fn create_genre(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(app, "POST", "/api/genres", Some(token), Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::OK);
    body["genre"]["id"].as_str().unwrap().to_string()
}

pub async fn create_mission(app: &Router, token: &str, genre_id: &str, body: Value) -> String {
    let uri = format!("/api/genres/{}/missions", genre_id);
    let (status, body) = send(app, "POST", &uri, Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    body["mission"]["id"].as_str().unwrap().to_string()
}

pub async fn create_task(app: &Router, token: &str, mission_id: &str, body: Value) -> String {
    let uri = format!("/api/missions/{}/tasks", mission_id);
    let (status, body) = send(app, "POST", &uri, Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    body["task"]["id"].as_str().unwrap().to_string()
}

/// Test helper: the caller's board as returned by GET /api/genres
pub async fn board(app: &Router, token: &str) -> Vec<Value> {
    let (status, body) = send(app, "GET", "/api/genres", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["genres"].as_array().unwrap().clone()
}

/// Test helper: ids of a JSON array of entities, in the order returned
pub fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}
