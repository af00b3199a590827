pub mod orders;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DbPoolStats {
    pub active_connections: u32,
    pub idle_connections: u32,
    pub max_connections: u32,
    pub usage_percent: f32,
}

impl DbPoolStats {
    fn of(pool: &PgPool) -> Self {
        let active_connections = pool.size();
        let max_connections = pool.options().get_max_connections();
        Self {
            active_connections,
            idle_connections: pool.num_idle() as u32,
            max_connections,
            usage_percent: active_connections as f32 * 100.0 / max_connections.max(1) as f32,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    /// `healthy` or `unhealthy`.
    pub status: String,
    pub version: String,
    /// `connected` or `disconnected`.
    pub db: String,
    pub db_pool: DbPoolStats,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthStatus),
        (status = 503, description = "Database unreachable", body = HealthStatus)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let connected = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    let (status, status_code, db) = if connected {
        ("healthy", StatusCode::OK, "connected")
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE, "disconnected")
    };

    let body = HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        db: db.to_string(),
        db_pool: DbPoolStats::of(&state.db),
    };

    (status_code, Json(body))
}
