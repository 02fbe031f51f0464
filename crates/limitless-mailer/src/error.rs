//! Error types for email dispatch

use thiserror::Error;

/// Result type alias for dispatch operations
pub type MailerResult<T> = Result<T, MailerError>;

/// Errors that can occur while sending email
#[derive(Error, Debug)]
pub enum MailerError {
    /// The provider refused the message; the message is safe to show to the caller
    #[error("Email rejected by provider ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the provider
        status: u16,
        /// Provider's explanation
        message: String,
    },

    /// The provider failed on its side
    #[error("Email provider unavailable ({status}): {message}")]
    Unavailable {
        /// HTTP status returned by the provider
        status: u16,
        /// Provider's explanation
        message: String,
    },

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with something other than the documented shape
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Invalid mailer configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl MailerError {
    /// Whether the failure was caused by the request content rather than the provider
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl From<MailerError> for limitless_core::Error {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::Rejected { status, message } => Self::Rejected { status, message },
            MailerError::Configuration { message } => Self::Configuration { message },
            other => Self::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejection_converts_to_core_rejection() {
        let err = MailerError::Rejected {
            status: 422,
            message: "Invalid `to` field".to_string(),
        };
        assert!(err.is_client_error());

        let core: limitless_core::Error = err.into();
        assert_eq!(core.user_message(), "Invalid `to` field");
    }

    #[test]
    fn test_outage_converts_to_transport() {
        let err = MailerError::Unavailable {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert!(!err.is_client_error());

        let core: limitless_core::Error = err.into();
        assert!(core.is_retryable());
    }
}
