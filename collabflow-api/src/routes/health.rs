//! Health check route.
//!
//! Unauthenticated liveness probe. Reports degraded with a 503 when the
//! database round-trip fails, so load balancers stop routing here.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::db::DbClient;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /health - Liveness probe
pub async fn health_check(State(db): State<Arc<DbClient>>) -> impl IntoResponse {
    match db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "up",
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: "down",
                }),
            )
        }
    }
}

pub fn create_router(db: DbClient) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(Arc::new(db))
}
