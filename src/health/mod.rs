/*!
 * # Health Check Module
 *
 * - `/health` pings the database and reports `up` or `down`
 * - `/health/live` answers as long as the process serves requests
 * - `/health/version` reports build information
 */

use crate::db::{self, DbPool};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: HealthStatus,
}

impl HealthInfo {
    pub fn from_database(database: HealthStatus) -> Self {
        Self {
            status: database,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            database,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Up => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Basic health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthInfo),
        (status = 503, description = "Database unreachable", body = HealthInfo),
    ),
    tag = "health"
)]
pub async fn health_check(State(db_pool): State<Arc<DbPool>>) -> impl IntoResponse {
    let database = match db::check_connection(db_pool.as_ref()).await {
        Ok(()) => HealthStatus::Up,
        Err(e) => {
            warn!(error = %e, "health check could not reach the database");
            HealthStatus::Down
        }
    };
    debug!(?database, "health check");

    let info = HealthInfo::from_database(database);
    (info.status_code(), Json(info))
}

/// Liveness check endpoint
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "alive": true,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "commit": option_env!("GIT_HASH").unwrap_or("unknown"),
    }))
}

/// Health routes, mounted under `/health`
pub fn health_routes(db_pool: Arc<DbPool>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
        .with_state(db_pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_database_means_unavailable() {
        let info = HealthInfo::from_database(HealthStatus::Down);
        assert_eq!(info.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            serde_json::to_value(&info).unwrap()["database"],
            serde_json::json!("down")
        );
    }

    #[test]
    fn up_database_is_ok() {
        let info = HealthInfo::from_database(HealthStatus::Up);
        assert_eq!(info.status_code(), StatusCode::OK);
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }
}
