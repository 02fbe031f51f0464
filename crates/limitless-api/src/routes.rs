//! API route definitions

use crate::{handlers, middleware, state::AppState};
use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use limitless_core::types::ErrorResponse;
use std::sync::Arc;

/// Public endpoints hit by the marketing site, rate limited per client
pub fn public_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leads", post(handlers::leads::submit_lead))
        .route("/api/analytics", post(handlers::analytics::record_event))
        .route("/api/email/inbound", post(handlers::email::inbound_email))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(state),
            middleware::rate_limit_middleware,
        ))
}

/// Back-office endpoints, behind the admin session check
pub fn admin_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/session", get(handlers::session::current_session))
        .route("/api/admin/logout", post(handlers::session::logout))
        .route("/api/admin/email/send", post(handlers::email::send_email))
        .route("/api/admin/leads/bulk", post(handlers::leads::bulk_leads))
        .route(
            "/api/admin/leads/export.csv",
            get(handlers::leads::export_leads),
        )
        .route(
            "/api/admin/collections/:collection",
            get(handlers::entities::list_entities).post(handlers::entities::create_entity),
        )
        .route(
            "/api/admin/collections/:collection/:id",
            get(handlers::entities::get_entity)
                .put(handlers::entities::update_entity)
                .delete(handlers::entities::delete_entity),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(state),
            middleware::require_admin_session,
        ))
}

/// Health check routes (no session required)
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
}

/// Combine all routes into a single router
pub fn build_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(public_routes(state))
        .merge(admin_routes(state))
        .merge(health_routes())
        .fallback(not_found_handler)
}

/// Handle 404 Not Found errors
async fn not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "The requested endpoint does not exist",
            "ROUTE_NOT_FOUND",
        )),
    )
}
