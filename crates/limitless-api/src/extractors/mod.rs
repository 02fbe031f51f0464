//! Custom extractors for request processing

use crate::error::ApiError;
use axum::{
    Json, async_trait,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{StatusCode, header, request::Parts},
};
use limitless_core::utils::client_address;
use limitless_database::AdminSessionDb;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use validator::Validate;

/// Caller details taken from proxy headers and the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client IP address, or `unknown`
    pub ip: String,
    /// User agent string
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Resolve the caller from request parts
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        let get = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string());

        Self {
            ip: client_address(get("x-forwarded-for"), get("x-real-ip"), peer.as_deref())
                .to_string(),
            user_agent: parts
                .headers
                .get(header::USER_AGENT)
                .and_then(|ua| ua.to_str().ok())
                .map(String::from),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// The admin session attached by the session middleware
#[derive(Debug, Clone)]
pub struct AdminSession(pub AdminSessionDb);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminSessionDb>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized("An admin session is required"))
    }
}

fn json_rejection(rejection: &JsonRejection) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "INVALID_JSON", rejection.body_text())
}

/// JSON body whose rejections use the API error format
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| json_rejection(&err))?;
        Ok(Self(data))
    }
}

/// JSON body that must also pass its `validator` rules
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(data) = JsonBody::<T>::from_request(req, state).await?;

        data.validate().map_err(|errors| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string().replace('\n', "; "),
            )
            .with_details(serde_json::json!(errors))
        })?;

        Ok(Self(data))
    }
}
