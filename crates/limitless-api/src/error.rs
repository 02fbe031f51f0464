//! HTTP error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use limitless_core::{Error, types::ErrorResponse};
use limitless_mailer::MailerError;
use tracing::error;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// An error ready to be sent as `(status, Json<ErrorResponse>)`
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body
    pub body: ErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(message, code),
        }
    }

    /// 400 with the given message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 401 with the given message
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.body.details = Some(details);
        self
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { ref field, .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.user_message(),
            )
            .with_details(serde_json::json!({ "field": field })),
            Error::NotFound { resource } => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found"),
            ),
            Error::Conflict { message } => Self::new(StatusCode::CONFLICT, "CONFLICT", message),
            Error::Rejected { status, message } => Self::new(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                "REJECTED",
                message,
            ),
            Error::Authentication(message) => Self::unauthorized(message),
            Error::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message),
            Error::RateLimitExceeded { message } => {
                Self::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", message)
            }
            Error::Timeout { .. } => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "The request timed out",
            ),
            Error::Transport(message) => {
                error!("Upstream failure: {}", message);
                Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", "Upstream service failed")
            }
            Error::Database(message) => {
                error!("Database error: {}", message);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Failed to access the database",
                )
            }
            other => {
                error!("Internal error: {}", other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error",
                )
            }
        }
    }
}

impl From<MailerError> for ApiError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::Rejected { message, .. } => {
                Self::new(StatusCode::BAD_REQUEST, "EMAIL_REJECTED", message)
            }
            other => {
                error!("Email dispatch failed: {}", other);
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "EMAIL_PROVIDER_ERROR",
                    "Email provider is unavailable",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Error::validation("email", "is required"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(Error::NotFound { resource: "leads/1".into() }, StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(Error::Conflict { message: "duplicate slug".into() }, StatusCode::CONFLICT, "CONFLICT")]
    #[case(Error::Authentication("expired".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(Error::Forbidden("admins only".into()), StatusCode::FORBIDDEN, "FORBIDDEN")]
    #[case(Error::Database("connection reset".into()), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")]
    #[case(Error::Transport("reset".into()), StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")]
    fn test_core_error_mapping(
        #[case] err: Error,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let api: ApiError = err.into();
        assert_eq!(api.status, status);
        assert_eq!(api.body.code, code);
    }

    #[test]
    fn test_validation_error_names_field() {
        let api: ApiError = Error::validation("email", "is required").into();

        assert_eq!(api.body.error, "email: is required");
        assert_eq!(api.body.details, Some(serde_json::json!({ "field": "email" })));
    }

    #[test]
    fn test_database_message_is_not_leaked() {
        let api: ApiError = Error::Database("password authentication failed".into()).into();
        assert!(!api.body.error.contains("password"));
    }

    #[test]
    fn test_provider_rejection_is_bad_request_with_provider_message() {
        let api: ApiError = MailerError::Rejected {
            status: 422,
            message: "The gmail.com domain is not verified".into(),
        }
        .into();

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.body.error, "The gmail.com domain is not verified");
    }

    #[test]
    fn test_provider_outage_is_bad_gateway() {
        let api: ApiError = MailerError::Unavailable {
            status: 503,
            message: "down".into(),
        }
        .into();
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
    }
}
