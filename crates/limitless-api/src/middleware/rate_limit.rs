//! Per-client rate limiting for the public endpoints

use crate::{error::ApiError, extractors::ClientInfo, state::AppState};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::{Clock, DefaultClock};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rate limiting middleware keyed by client IP
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let client_key = format!("ip:{}", ClientInfo::from_parts(&parts).ip);
    let request = Request::from_parts(parts, body);

    let limiter = state.rate_limiter(&client_key);
    match limiter.check() {
        Ok(()) => {
            debug!("Rate limit check passed for client: {}", client_key);

            let mut response = next.run(request).await;
            response.headers_mut().insert(
                "x-ratelimit-limit",
                HeaderValue::from(state.config.api.rate_limit),
            );
            response
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs()
                .max(1);
            warn!(
                "Rate limit exceeded for client: {} (retry after {}s)",
                client_key, retry_after
            );

            let mut response = ApiError::new(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Rate limit exceeded. Try again in {retry_after} seconds"),
            )
            .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}
