//! Core types and logic for the Limitless back-office
//!
//! Shared by the API server and the admin UI: configuration, the error type,
//! entity schemas, the breadcrumb deriver, the management-screen state machine
//! and the signed-in session context.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod breadcrumbs;
pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod screen;
pub mod session;
pub mod types;
pub mod utils;

/// Error with context for the binaries' top-level `main`
pub mod context_error {
    use std::{error::Error as StdError, fmt};

    /// An error message, optionally wrapping the error that caused it
    #[derive(Debug)]
    pub struct ContextError {
        source: Option<Box<dyn StdError + Send + Sync>>,
        message: String,
    }

    impl ContextError {
        /// Create a context error from a message
        pub fn new<S: Into<String>>(message: S) -> Self {
            Self {
                source: None,
                message: message.into(),
            }
        }

        /// Wrap `error` with a message describing what was being attempted
        pub fn with_context<E, S>(error: E, message: S) -> Self
        where
            E: StdError + Send + Sync + 'static,
            S: Into<String>,
        {
            Self {
                source: Some(Box::new(error)),
                message: message.into(),
            }
        }
    }

    impl fmt::Display for ContextError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match &self.source {
                Some(source) => write!(f, "{}: {source}", self.message),
                None => f.write_str(&self.message),
            }
        }
    }

    impl StdError for ContextError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn StdError + 'static))
        }
    }

    /// Result type alias for context errors
    pub type Result<T> = std::result::Result<T, ContextError>;

    /// Build a [`ContextError`] from a format string
    #[macro_export]
    macro_rules! context_error {
        ($msg:literal) => {
            $crate::context_error::ContextError::new(format!($msg))
        };
        ($fmt:expr, $($arg:tt)*) => {
            $crate::context_error::ContextError::new(format!($fmt, $($arg)*))
        };
    }

    /// Extension trait for adding context to results
    pub trait ResultExt<T> {
        /// Wrap the error with the message produced by `f`
        ///
        /// # Errors
        ///
        /// Returns the wrapped error if `self` is an error.
        fn context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>;
    }

    impl<T, E> ResultExt<T> for std::result::Result<T, E>
    where
        E: StdError + Send + Sync + 'static,
    {
        fn context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>,
        {
            self.map_err(|e| ContextError::with_context(e, f()))
        }
    }

    impl From<crate::Error> for ContextError {
        fn from(err: crate::Error) -> Self {
            Self::with_context(err, "Back-office operation failed")
        }
    }

    impl From<std::io::Error> for ContextError {
        fn from(err: std::io::Error) -> Self {
            Self::with_context(err, "I/O operation failed")
        }
    }

}

pub use breadcrumbs::{BreadcrumbItem, derive_breadcrumbs};
pub use config::Config;
pub use entity::{EntityKind, FieldSpec, FieldType, FieldValue, Fields, ManagedEntity, ValidationMode};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use screen::{EntityStore, ManagementScreen, ScreenState, ScreenView};
pub use session::{Role, Session, SessionContext};
