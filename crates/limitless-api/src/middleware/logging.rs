//! Request logging middleware

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, info, warn};

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Wrap each request in a `request` span and echo its request ID
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .map_or_else(generate_request_id, String::from);

    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    );

    async move {
        let mut response = next.run(request).await;
        let elapsed = start_time.elapsed();
        let status = response.status();

        if status.is_server_error() || status.is_client_error() {
            warn!(status = %status, elapsed = ?elapsed, "Request completed with error");
        } else {
            info!(status = %status, elapsed = ?elapsed, "Request completed");
        }

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID.clone(), value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Generate a unique request ID for tracing
fn generate_request_id() -> String {
    use rand::Rng;
    format!("req_{:016x}", rand::thread_rng().r#gen::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_request_ids_are_distinct() {
        let first = generate_request_id();
        let second = generate_request_id();

        assert!(first.starts_with("req_"));
        assert_eq!(first.len(), 20);
        assert_ne!(first, second);
    }
}
