//! Integration tests for health check and general API behavior.
//!
//! Tests cover:
//! - Health check endpoint
//! - Unknown routes

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "siemlab-api");
    assert_eq!(response["dialects"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _state) = test_app();

    let (status, _) = get(app, "/api/v1/logs").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
