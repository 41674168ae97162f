//! Health check handler.
//!
//! Reports database reachability and migration state for monitoring.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

/// `GET /api/health`: 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    if !state.db.health_check().await {
        return Err(ApiError::Unavailable("Database unreachable".to_string()));
    }

    let migrations = state.db.migration_status().await?;

    Ok(Json(HealthResponse {
        status: if migrations.is_current() { "ok" } else { "degraded" },
        database: "ok",
        migrations_applied: migrations.applied,
        migrations_total: migrations.total,
    }))
}
