//! Health check endpoint.
//!
//! Reports liveness plus the dialects this build can compile, so front-ends
//! can populate their language picker without a separate call.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use shared::models::Dialect;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status (always "healthy" if reachable).
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Supported dialect tags.
    pub dialects: Vec<&'static str>,
}

/// Creates the health check routes.
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "siemlab-api",
        version: env!("CARGO_PKG_VERSION"),
        dialects: Dialect::ALL.into_iter().map(Dialect::tag).collect(),
    })
}
