//! Current-session and logout endpoints

use crate::{error::ApiResult, extractors::AdminSession, state::AppState};
use axum::{extract::State, response::Json};
use limitless_core::types::{Accepted, SessionInfo};
use limitless_database::SessionQueries;
use std::sync::Arc;
use tracing::info;

/// Reason recorded when an admin signs out
const LOGOUT_REASON: &str = "user_logout";

/// Identity behind the presented token
pub async fn current_session(AdminSession(session): AdminSession) -> Json<SessionInfo> {
    Json(session.info())
}

/// Revoke the presented session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AdminSession(session): AdminSession,
) -> ApiResult<Json<Accepted>> {
    let revoked = SessionQueries::revoke(&state.pool, session.id, LOGOUT_REASON).await?;
    info!(user_id = %session.user_id, revoked, "Admin signed out");
    Ok(Json(Accepted { success: true }))
}
