//! Integration tests for the board endpoints
//!
//! - CRUD at each level, partial updates, lenient dates
//! - Ownership: 404 for missing, 403 for someone else's
//! - Manual moves: duplicate repair, group boundaries, list boundaries
//! - Mission completion following its tasks

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::{json, Value};

/// Persisted order of every task of a mission, keyed by id
async fn task_orders(db: &sqlx::SqlitePool, mission_id: &str) -> Vec<(String, i64)> {
    sqlx::query_as("SELECT id, sort_order FROM tasks WHERE mission_id = ? ORDER BY id")
        .bind(mission_id)
        .fetch_all(db)
        .await
        .unwrap()
}

fn find<'a>(items: &'a [Value], id: &str) -> &'a Value {
    items.iter().find(|item| item["id"] == id).unwrap()
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_genre_crud() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "crud@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/genres",
        Some(&token),
        Some(json!({ "name": "  Work ", "summary": "  day job " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genre"]["name"], "Work");
    assert_eq!(body["genre"]["summary"], "day job");
    assert_eq!(body["genre"]["order"], 0);
    let id = body["genre"]["id"].as_str().unwrap().to_string();

    let second = create_genre(&app, &token, "Home").await;
    let genres = board(&app, &token).await;
    assert_eq!(ids(&Value::Array(genres)), vec![id.clone(), second]);

    // Absent name stays, explicit null summary clears
    let uri = format!("/api/genres/{}", id);
    let (status, body) = send(&app, "PATCH", &uri, Some(&token), Some(json!({ "summary": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genre"]["name"], "Work");
    assert!(body["genre"]["summary"].is_null());

    let (status, _) = send(&app, "PATCH", &uri, Some(&token), Some(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(board(&app, &token).await.len(), 1);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_name() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "name@example.com").await;

    let (status, body) = send(&app, "POST", "/api/genres", Some(&token), Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "POST", "/api/genres", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dates_are_lenient() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "dates@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;

    let uri = format!("/api/genres/{}/missions", genre);
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "name": "Impossible", "due_date": "2025-02-30" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["mission"]["due_date"].is_null());

    let (_, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "name": "Real", "due_date": "2025-03-01" })),
    )
    .await;
    assert_eq!(body["mission"]["due_date"], "2025-03-01");
    let mission = body["mission"]["id"].as_str().unwrap().to_string();

    // Garbage in a PATCH clears rather than fails
    let patch_uri = format!("/api/missions/{}", mission);
    let (status, body) = send(
        &app,
        "PATCH",
        &patch_uri,
        Some(&token),
        Some(json!({ "due_date": "03/01/2025" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["mission"]["due_date"].is_null());
}

#[tokio::test]
async fn test_done_must_be_boolean() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "bool@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;
    let mission = create_mission(&app, &token, &genre, json!({ "name": "Ship" })).await;
    let task = create_task(&app, &token, &mission, json!({ "name": "Write" })).await;

    let uri = format!("/api/tasks/{}", task);
    let (status, _) = send(&app, "PATCH", &uri, Some(&token), Some(json!({ "done": "yes" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "PATCH", &uri, Some(&token), Some(json!({ "done": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["done"], true);
    assert!(body["task"]["completed_at"].is_string());
}

#[tokio::test]
async fn test_delete_mission_and_task() {
    let (app, db) = setup_app().await;
    let token = login_as(&app, "del@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;
    let mission = create_mission(&app, &token, &genre, json!({ "name": "Ship" })).await;
    let keep = create_task(&app, &token, &mission, json!({ "name": "Keep" })).await;
    let dropped = create_task(&app, &token, &mission, json!({ "name": "Drop" })).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/tasks/{}", dropped), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let remaining: Vec<String> = task_orders(&db, &mission).await.into_iter().map(|(id, _)| id).collect();
    assert_eq!(remaining, vec![keep]);

    let (status, _) = send(&app, "DELETE", &format!("/api/missions/{}", mission), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(task_orders(&db, &mission).await.is_empty());
}

// =============================================================================
// Ownership
// =============================================================================

#[tokio::test]
async fn test_foreign_entities_are_forbidden() {
    let (app, _db) = setup_app().await;
    let owner = login_as(&app, "owner@example.com").await;
    let intruder = login_as(&app, "intruder@example.com").await;

    let genre = create_genre(&app, &owner, "Private").await;
    let mission = create_mission(&app, &owner, &genre, json!({ "name": "Secret" })).await;
    let task = create_task(&app, &owner, &mission, json!({ "name": "Hidden" })).await;

    let attempts = [
        ("PATCH", format!("/api/genres/{}", genre), Some(json!({ "name": "Mine" }))),
        ("DELETE", format!("/api/genres/{}", genre), None),
        ("POST", format!("/api/genres/{}/missions", genre), Some(json!({ "name": "x" }))),
        ("POST", format!("/api/genres/{}/move/up", genre), None),
        ("PATCH", format!("/api/missions/{}", mission), Some(json!({ "name": "Mine" }))),
        ("POST", format!("/api/missions/{}/tasks", mission), Some(json!({ "name": "x" }))),
        ("POST", format!("/api/missions/{}/move/down", mission), None),
        ("PATCH", format!("/api/tasks/{}", task), Some(json!({ "done": true }))),
        ("DELETE", format!("/api/tasks/{}", task), None),
        ("POST", format!("/api/tasks/{}/move/up", task), None),
    ];

    for (method, uri, body) in attempts {
        let (status, _) = send(&app, method, &uri, Some(&intruder), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
    }

    // Intruder's board does not leak anything
    assert!(board(&app, &intruder).await.is_empty());
    assert_eq!(board(&app, &owner).await.len(), 1);
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "ghost@example.com").await;

    for (method, uri) in [
        ("PATCH", "/api/genres/nope"),
        ("DELETE", "/api/missions/nope"),
        ("POST", "/api/tasks/nope/move/up"),
        ("POST", "/api/missions/nope/tasks"),
    ] {
        let (status, _) = send(&app, method, uri, Some(&token), Some(json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
    }
}

// =============================================================================
// Moves
// =============================================================================

#[tokio::test]
async fn test_invalid_direction() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "dir@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;

    let uri = format!("/api/genres/{}/move/sideways", genre);
    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_move_repairs_duplicate_orders() {
    let (app, db) = setup_app().await;
    let token = login_as(&app, "dupes@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;
    let mission = create_mission(&app, &token, &genre, json!({ "name": "Ship" })).await;
    for name in ["A", "B", "C"] {
        create_task(&app, &token, &mission, json!({ "name": name })).await;
    }

    sqlx::query("UPDATE tasks SET sort_order = 5 WHERE mission_id = ?")
        .bind(&mission)
        .execute(&db)
        .await
        .unwrap();

    let before = ids(&board(&app, &token).await[0]["missions"][0]["tasks"]);
    let uri = format!("/api/tasks/{}/move/up", before[1]);
    let (status, _) = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let after = board(&app, &token).await;
    let tasks = after[0]["missions"][0]["tasks"].as_array().unwrap();
    assert_eq!(
        ids(&after[0]["missions"][0]["tasks"]),
        vec![before[1].clone(), before[0].clone(), before[2].clone()]
    );
    let orders: Vec<i64> = tasks.iter().map(|t| t["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![5, 6, 7]);
}

#[tokio::test]
async fn test_cross_group_move_rejected_without_change() {
    let (app, db) = setup_app().await;
    let token = login_as(&app, "cross@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;
    let mission = create_mission(&app, &token, &genre, json!({ "name": "Ship" })).await;
    let undated = create_task(&app, &token, &mission, json!({ "name": "Someday" })).await;
    let dated = create_task(
        &app,
        &token,
        &mission,
        json!({ "name": "Deadline", "due_date": "2025-01-15" }),
    )
    .await;

    // Dated sorts first even though it was created second
    let genres = board(&app, &token).await;
    assert_eq!(ids(&genres[0]["missions"][0]["tasks"]), vec![dated, undated.clone()]);

    let before = task_orders(&db, &mission).await;
    let uri = format!("/api/tasks/{}/move/up", undated);
    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("due date takes precedence"));
    assert_eq!(task_orders(&db, &mission).await, before);
}

#[tokio::test]
async fn test_move_past_boundary_rejected() {
    let (app, db) = setup_app().await;
    let token = login_as(&app, "edge@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;
    let mission = create_mission(&app, &token, &genre, json!({ "name": "Ship" })).await;
    let first = create_task(&app, &token, &mission, json!({ "name": "First" })).await;
    let last = create_task(&app, &token, &mission, json!({ "name": "Last" })).await;
    let before = task_orders(&db, &mission).await;

    let (status, body) = send(&app, "POST", &format!("/api/tasks/{}/move/up", first), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Cannot move"));

    let (status, _) = send(&app, "POST", &format!("/api/tasks/{}/move/down", last), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(task_orders(&db, &mission).await, before);
}

#[tokio::test]
async fn test_move_up_then_down_restores_order() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "undo@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;
    let mut missions = Vec::new();
    for name in ["One", "Two", "Three"] {
        missions.push(create_mission(&app, &token, &genre, json!({ "name": name })).await);
    }
    let original = ids(&board(&app, &token).await[0]["missions"]);
    assert_eq!(original, missions);

    let up = format!("/api/missions/{}/move/up", missions[2]);
    assert_eq!(send(&app, "POST", &up, Some(&token), None).await.0, StatusCode::OK);
    assert_eq!(
        ids(&board(&app, &token).await[0]["missions"]),
        vec![missions[0].clone(), missions[2].clone(), missions[1].clone()]
    );

    let down = format!("/api/missions/{}/move/down", missions[2]);
    assert_eq!(send(&app, "POST", &down, Some(&token), None).await.0, StatusCode::OK);
    assert_eq!(ids(&board(&app, &token).await[0]["missions"]), original);
}

#[tokio::test]
async fn test_genres_move_in_manual_order() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "genres@example.com").await;
    let work = create_genre(&app, &token, "Work").await;
    let home = create_genre(&app, &token, "Home").await;

    let (status, _) = send(&app, "POST", &format!("/api/genres/{}/move/up", home), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(ids(&Value::Array(board(&app, &token).await)), vec![home, work]);
}

// =============================================================================
// Completion and read model
// =============================================================================

#[tokio::test]
async fn test_mission_completion_follows_tasks() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "done@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;
    let mission = create_mission(&app, &token, &genre, json!({ "name": "Ship" })).await;
    let mut tasks = Vec::new();
    for name in ["a", "b", "c"] {
        tasks.push(create_task(&app, &token, &mission, json!({ "name": name })).await);
    }

    for task in &tasks[..2] {
        let uri = format!("/api/tasks/{}", task);
        send(&app, "PATCH", &uri, Some(&token), Some(json!({ "done": true }))).await;
    }
    let genres = board(&app, &token).await;
    let view = &genres[0]["missions"][0];
    assert!(view["completed_at"].is_null());
    assert!((view["progress"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(genres[0]["incomplete_missions"], 1);

    let last = format!("/api/tasks/{}", tasks[2]);
    send(&app, "PATCH", &last, Some(&token), Some(json!({ "done": true }))).await;
    let genres = board(&app, &token).await;
    assert!(genres[0]["missions"][0]["completed_at"].is_string());
    assert_eq!(genres[0]["missions"][0]["progress"], 1.0);
    assert_eq!(genres[0]["incomplete_missions"], 0);

    let reopen = format!("/api/tasks/{}", tasks[0]);
    send(&app, "PATCH", &reopen, Some(&token), Some(json!({ "done": false }))).await;
    assert!(board(&app, &token).await[0]["missions"][0]["completed_at"].is_null());
}

#[tokio::test]
async fn test_board_display_order() {
    let (app, _db) = setup_app().await;
    let token = login_as(&app, "view@example.com").await;
    let genre = create_genre(&app, &token, "Work").await;

    let finished = create_mission(&app, &token, &genre, json!({ "name": "Finished" })).await;
    let later = create_mission(&app, &token, &genre, json!({ "name": "Later", "due_date": "2025-09-01" })).await;
    let undated = create_mission(&app, &token, &genre, json!({ "name": "Whenever" })).await;
    let sooner = create_mission(&app, &token, &genre, json!({ "name": "Sooner", "due_date": "2025-02-01" })).await;

    let task = create_task(&app, &token, &finished, json!({ "name": "only" })).await;
    send(&app, "PATCH", &format!("/api/tasks/{}", task), Some(&token), Some(json!({ "done": true }))).await;

    let genres = board(&app, &token).await;
    let missions = genres[0]["missions"].as_array().unwrap();
    assert_eq!(
        ids(&genres[0]["missions"]),
        vec![sooner, later, undated.clone(), finished.clone()]
    );
    assert_eq!(find(missions, &undated)["progress"], 0.0);
    assert_eq!(find(missions, &finished)["tasks"][0]["done"], true);
    assert_eq!(genres[0]["incomplete_missions"], 3);
}
