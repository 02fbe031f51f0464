//! Resend-compatible HTTP email backend

use crate::error::{MailerError, MailerResult};
use crate::service::{EmailDispatcher, EmailMessage, MessageReceipt};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Sends mail through the provider's `POST /emails` endpoint
pub struct ResendDispatcher {
    /// Base URL without trailing slash
    base_url: String,

    /// API key sent as a bearer token
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl std::fmt::Debug for ResendDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendDispatcher")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ResendDispatcher {
    /// Create a dispatcher for `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> MailerResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MailerError::Configuration {
                message: "mailer.api_key is required for the resend provider".to_string(),
            });
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl EmailDispatcher for ResendDispatcher {
    async fn send(&self, message: &EmailMessage) -> MailerResult<MessageReceipt> {
        let url = format!("{}/emails", self.base_url);
        let body = SendRequest {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let sent: SendResponse = response
                .json()
                .await
                .map_err(|e| MailerError::InvalidResponse(e.to_string()))?;
            debug!(id = %sent.id, "Email accepted by provider");
            return Ok(MessageReceipt { id: sent.id });
        }

        let text = response.text().await.unwrap_or_default();
        let detail: ProviderError = serde_json::from_str(&text).unwrap_or_default();
        let message = detail
            .message
            .or(detail.name)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        warn!(status = status.as_u16(), %message, "Email provider refused message");
        if status.is_client_error() {
            Err(MailerError::Rejected {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(MailerError::Unavailable {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn name(&self) -> &str {
        "resend"
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> EmailMessage {
        EmailMessage {
            from: "Limitless <no-reply@example.com>".to_string(),
            to: vec!["ada@example.com".to_string()],
            subject: "Welcome".to_string(),
            html: "<p>Hello</p>".to_string(),
        }
    }

    fn dispatcher(server: &MockServer) -> ResendDispatcher {
        ResendDispatcher::new(server.uri(), "re_test", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_success_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_json(serde_json::json!({
                "from": "Limitless <no-reply@example.com>",
                "to": ["ada@example.com"],
                "subject": "Welcome",
                "html": "<p>Hello</p>"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "em_123"})))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = dispatcher(&server).send(&message()).await.unwrap();
        assert_eq!(receipt.id, "em_123");
    }

    #[tokio::test]
    async fn test_validation_failure_is_rejected_with_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "statusCode": 422,
                "name": "validation_error",
                "message": "Invalid `to` field."
            })))
            .mount(&server)
            .await;

        let err = dispatcher(&server).send(&message()).await.unwrap_err();
        match err {
            MailerError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid `to` field.");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = dispatcher(&server).send(&message()).await.unwrap_err();
        assert!(matches!(err, MailerError::Unavailable { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let err = dispatcher(&server).send(&message()).await.unwrap_err();
        assert!(matches!(err, MailerError::InvalidResponse(_)));
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let result = ResendDispatcher::new("https://api.resend.com", " ", Duration::from_secs(5));
        assert!(matches!(result, Err(MailerError::Configuration { .. })));
    }
}
