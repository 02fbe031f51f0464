//! Liveness and readiness probes

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Instant};
use tracing::error;

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Always `"healthy"` when the body is returned
    pub status: String,
    /// Crate version of the server
    pub version: String,
    /// When the probe ran
    pub checked_at: DateTime<Utc>,
    /// Seconds since the router was built
    pub uptime_seconds: u64,
    /// Email backend name
    pub mailer: String,
    /// Connection pool snapshot
    pub database: PoolHealth,
}

/// Connection pool snapshot taken after a successful ping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolHealth {
    /// Open connections
    pub connections: u32,
    /// Connections waiting for work
    pub idle: u32,
    /// Round trip of the ping
    pub ping_ms: u64,
}

/// Body of `GET /ready`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Readiness {
    /// True once the database answers
    pub ready: bool,
    /// When the probe ran
    pub checked_at: DateTime<Utc>,
}

fn database_unavailable() -> ApiError {
    ApiError::new(
        StatusCode::SERVICE_UNAVAILABLE,
        "DATABASE_UNAVAILABLE",
        "The database is not reachable",
    )
}

async fn ping(state: &AppState) -> ApiResult<PoolHealth> {
    let started = Instant::now();
    limitless_database::health_check(&state.pool)
        .await
        .map_err(|e| {
            error!("Database ping failed: {}", e);
            database_unavailable()
        })?;

    Ok(PoolHealth {
        connections: state.pool.size(),
        idle: u32::try_from(state.pool.num_idle()).unwrap_or(u32::MAX),
        ping_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}

/// Service status with a database ping; 503 when the database is down
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<ServiceHealth>> {
    let database = ping(&state).await?;

    Ok(Json(ServiceHealth {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checked_at: Utc::now(),
        uptime_seconds: state.uptime_seconds(),
        mailer: state.mailer.name().to_string(),
        database,
    }))
}

/// Readiness for load balancers
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<Readiness>> {
    ping(&state).await?;
    Ok(Json(Readiness {
        ready: true,
        checked_at: Utc::now(),
    }))
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_service_health_shape() {
        let body = ServiceHealth {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            checked_at: Utc::now(),
            uptime_seconds: 60,
            mailer: "mock".to_string(),
            database: PoolHealth {
                connections: 4,
                idle: 3,
                ping_ms: 2,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"]["idle"], 3);
        assert_eq!(json["mailer"], "mock");
    }

    #[test]
    fn test_unavailable_database_is_503() {
        let err = database_unavailable();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.body.code, "DATABASE_UNAVAILABLE");
    }
}
