//! Integration tests for the lesson endpoints.
//!
//! Tests cover:
//! - Listing lessons per dialect
//! - Lesson detail
//! - Passing and failing attempts
//! - Lookup errors

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, post_json, test_app};

#[tokio::test]
async fn test_every_dialect_has_lessons_starting_with_theory() {
    let (app, _state) = test_app();

    for dialect in ["sql", "spl", "kql", "sigma"] {
        let (status, response) = get(app.clone(), &format!("/api/v1/lessons/{dialect}")).await;
        assert_eq!(status, StatusCode::OK);
        let lessons = response["lessons"].as_array().unwrap();
        assert!(lessons.len() > 1, "{dialect} has no lessons");
        assert_eq!(lessons[0]["kind"], "theory");
    }
}

#[tokio::test]
async fn test_lesson_detail_includes_task_and_check() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/v1/lessons/spl/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["dialect"], "spl");
    assert_eq!(response["index"], 3);
    assert_eq!(response["data_source"], "auth_logs");
    assert!(response["task"].is_string());
    assert!(response["check"]["type"].is_string());
}

#[tokio::test]
async fn test_attempt_pass_and_fail() {
    let (app, _state) = test_app();
    let uri = "/api/v1/lessons/spl/7/attempts";

    let (status, response) = post_json(
        app.clone(),
        uri,
        json!({"query": "search action=failed_login | stats count by username | sort -count | head 1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["passed"], true);
    assert_eq!(response["results"], json!([{"username": "admin", "count": 4}]));

    let (status, response) = post_json(
        app,
        uri,
        json!({"query": "search action=failed_login | stats count by username"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["passed"], false);
    assert_eq!(response["returned_count"], 4);
}

#[tokio::test]
async fn test_attempt_uses_the_lesson_data_source() {
    let (app, _state) = test_app();

    let (status, response) = post_json(
        app,
        "/api/v1/lessons/sigma/4/attempts",
        json!({"query": "title: t\ndetection:\n  selection:\n    process_name: powershell\n  condition: selection"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["passed"], true);
    assert_eq!(response["results"][0]["process_name"], "powershell.exe");
}

#[tokio::test]
async fn test_lesson_errors() {
    let (app, _state) = test_app();

    let (status, response) = get(app.clone(), "/api/v1/lessons/lucene").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "unsupported_dialect");

    let (status, response) = get(app.clone(), "/api/v1/lessons/sql/100").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "unknown_lesson");

    let (status, response) = post_json(
        app.clone(),
        "/api/v1/lessons/sql/0/attempts",
        json!({"query": "SELECT * FROM auth_logs"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "no_exercise");

    let (status, response) = post_json(
        app,
        "/api/v1/lessons/sql/1/attempts",
        json!({"query": "FROM auth_logs"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "parse_error");
}
