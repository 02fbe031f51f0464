//! In-memory dispatcher for development and tests

use crate::error::{MailerError, MailerResult};
use crate::service::{EmailDispatcher, EmailMessage, MessageReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Dispatcher that records messages instead of sending them
#[derive(Debug, Clone, Default)]
pub struct MockDispatcher {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failure: Option<String>,
}

impl MockDispatcher {
    /// Create a dispatcher that accepts every message
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every message with `message`
    #[must_use]
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Messages accepted so far
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl EmailDispatcher for MockDispatcher {
    async fn send(&self, message: &EmailMessage) -> MailerResult<MessageReceipt> {
        if let Some(reason) = &self.failure {
            return Err(MailerError::Rejected {
                status: 422,
                message: reason.clone(),
            });
        }

        let id = format!("mock-{}", uuid::Uuid::new_v4());
        info!(%id, to = ?message.to, subject = %message.subject, "Mock email recorded");
        self.sent.lock().push(message.clone());
        Ok(MessageReceipt { id })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "no-reply@example.com".to_string(),
            to: vec!["ada@example.com".to_string()],
            subject: "Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_records_messages() {
        let mock = MockDispatcher::new();
        let handle = mock.clone();

        let receipt = mock.send(&message()).await.unwrap();

        assert!(receipt.id.starts_with("mock-"));
        assert_eq!(handle.sent(), vec![message()]);
        assert_eq!(mock.name(), "mock");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockDispatcher::new().with_failure("Domain not verified");

        let err = mock.send(&message()).await.unwrap_err();

        assert!(matches!(err, MailerError::Rejected { ref message, .. } if message == "Domain not verified"));
        assert!(mock.sent().is_empty());
    }
}
