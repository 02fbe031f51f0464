//! Analytics ingestion

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ClientInfo, ValidatedJson},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use limitless_core::types::{Accepted, AnalyticsEvent};
use limitless_database::AnalyticsQueries;
use std::sync::Arc;
use tracing::{debug, error};

/// Record an analytics event posted by the public site
pub async fn record_event(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    ValidatedJson(mut event): ValidatedJson<AnalyticsEvent>,
) -> ApiResult<Json<Accepted>> {
    if event.user_agent.is_none() {
        event.user_agent = client.user_agent;
    }

    match AnalyticsQueries::insert(&state.pool, &event, Some(&client.ip)).await {
        Ok(id) => {
            debug!(%id, event_type = %event.event_type, "Analytics event recorded");
            Ok(Json(Accepted { success: true }))
        }
        Err(e) => {
            error!("Analytics insert error: {}", e);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Failed to save analytics data",
            ))
        }
    }
}
