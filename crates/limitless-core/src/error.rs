//! Error types for the Limitless back-office

use std::{error::Error as StdError, fmt};

/// Main error type shared by the API server, the backing store and the admin screens
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// A field failed schema validation before any network round trip
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Database error
    Database(String),

    /// Not found error
    NotFound {
        /// Resource that was not found
        resource: String,
    },

    /// Write rejected because it conflicts with existing data
    Conflict {
        /// Conflict description
        message: String,
    },

    /// The backing store rejected a request; the message is shown verbatim
    Rejected {
        /// HTTP status returned by the store
        status: u16,
        /// Message returned by the store
        message: String,
    },

    /// Network or transport failure talking to the backing store
    Transport(String),

    /// Authentication error
    Authentication(String),

    /// Authenticated but not allowed
    Forbidden(String),

    /// Rate limit error
    RateLimitExceeded {
        /// Rate limit message
        message: String,
    },

    /// Timeout error
    Timeout {
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// Serialization error
    Serialization(serde_json::Error),

    /// Other error
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a validation failure on `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Message suitable for showing inline next to the affected row or form
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { field, message } => format!("{field}: {message}"),
            Self::Rejected { message, .. } => message.clone(),
            Self::NotFound { resource } => format!("{resource} no longer exists"),
            Self::Conflict { message } => message.clone(),
            Self::Transport(_) | Self::Timeout { .. } => {
                "Could not reach the server. Please try again.".to_string()
            }
            Self::Authentication(_) => "Your session has expired. Please sign in again.".to_string(),
            Self::Forbidden(_) => "You do not have permission to do that.".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether re-triggering the same action may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Timeout { .. }
                | Self::RateLimitExceeded { .. }
                | Self::Database(_)
        ) || matches!(self, Self::Rejected { status, .. } if *status >= 500)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Database(msg) => write!(f, "Database error: {msg}"),
            Self::NotFound { resource } => write!(f, "Resource not found: {resource}"),
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Rejected { status, message } => {
                write!(f, "Request rejected ({status}): {message}")
            }
            Self::Transport(msg) => write!(f, "Transport error: {msg}"),
            Self::Authentication(msg) => write!(f, "Authentication failed: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::RateLimitExceeded { message } => write!(f, "Rate limit exceeded: {message}"),
            Self::Timeout { duration_ms } => {
                write!(f, "Operation timed out after {duration_ms}ms")
            }
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}
