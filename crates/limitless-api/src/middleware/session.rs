//! Admin session verification
//!
//! Sessions are issued by the external auth provider into `admin_sessions`;
//! requests present the raw token as `Authorization: Bearer <token>` and are
//! matched by its MD5 digest.

use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use limitless_database::SessionQueries;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reject requests without a live admin session and attach the session otherwise
///
/// # Errors
///
/// 401 for a missing, malformed, unknown or expired token; 403 when the
/// session's role is not an admin role.
pub async fn require_admin_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.security.require_session {
        debug!("Session requirement disabled, skipping verification");
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())?;
    let session = SessionQueries::find_active(&state.pool, &token_hash(token)).await?;

    let role = session.role();
    if !role.is_admin() {
        warn!(user_id = %session.user_id, %role, "Non-admin session rejected");
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "Admin access required",
        ));
    }

    if let Err(e) = SessionQueries::touch(&state.pool, session.id).await {
        warn!("Failed to record session activity: {}", e);
    }

    debug!(user_id = %session.user_id, "Admin session verified");
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Extract the bearer token from `Authorization`
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Authorization header required"))?;

    value
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::unauthorized("Invalid Authorization header format. Use 'Bearer <token>'")
        })
}

/// Hex MD5 digest stored in `admin_sessions.token_hash`
#[must_use]
pub fn token_hash(token: &str) -> String {
    format!("{:x}", md5::compute(token))
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn headers(auth: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(auth) = auth {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        }
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers(Some("Bearer abc123"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer "))]
    #[case(Some("bearer abc"))]
    fn test_bearer_token_rejected(#[case] auth: Option<&str>) {
        let err = bearer_token(&headers(auth)).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_token_hash_is_md5_hex() {
        assert_eq!(token_hash("secret"), "5ebe2294ecd0e0f08eab7690d2a6ee69");
        assert_eq!(token_hash("secret").len(), 32);
    }
}
