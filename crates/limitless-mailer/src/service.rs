//! Email dispatch trait and message types

use crate::error::MailerResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Interface every email backend implements
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Hand a message to the provider
    async fn send(&self, message: &EmailMessage) -> MailerResult<MessageReceipt>;

    /// Backend name, for logs
    fn name(&self) -> &str;
}

/// A message ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Sender, e.g. `Name <addr@domain>`
    pub from: String,
    /// Recipients
    pub to: Vec<String>,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

impl EmailMessage {
    /// Build a single-recipient message, using `default_from` when `from` is blank
    #[must_use]
    pub fn from_request(request: &limitless_core::types::EmailRequest, default_from: &str) -> Self {
        let from = if request.from.trim().is_empty() {
            default_from.to_string()
        } else {
            request.from.trim().to_string()
        };
        Self {
            from,
            to: vec![request.to.trim().to_string()],
            subject: request.subject.clone(),
            html: request.html_body.clone(),
        }
    }
}

/// Provider acknowledgement of an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    /// Provider message identifier
    pub id: String,
}
