//! Transactional email dispatch for the Limitless back-office
//!
//! [`from_config`] picks a backend from [`MailerConfig`]: the Resend-compatible
//! HTTP backend when `provider = "resend"`, otherwise an in-memory mock.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod mock;
pub mod resend;
pub mod service;

pub use error::{MailerError, MailerResult};
pub use mock::MockDispatcher;
pub use resend::ResendDispatcher;
pub use service::{EmailDispatcher, EmailMessage, MessageReceipt};

use limitless_core::config::MailerConfig;
use std::sync::Arc;
use std::time::Duration;

/// Build the dispatcher named by `config.provider`
///
/// # Errors
///
/// Returns an error if the provider is unknown or `resend` is selected without an API key.
pub fn from_config(config: &MailerConfig) -> MailerResult<Arc<dyn EmailDispatcher>> {
    match config.provider.as_str() {
        "resend" => {
            let api_key = config.api_key.clone().unwrap_or_default();
            let dispatcher = ResendDispatcher::new(
                config.base_url.clone(),
                api_key,
                Duration::from_secs(config.timeout_seconds),
            )?;
            Ok(Arc::new(dispatcher))
        }
        "mock" => Ok(Arc::new(MockDispatcher::new())),
        other => Err(MailerError::Configuration {
            message: format!("unknown mailer provider '{other}'"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_uses_mock() {
        let dispatcher = from_config(&MailerConfig::default()).unwrap();
        assert_eq!(dispatcher.name(), "mock");
    }

    #[test]
    fn test_resend_requires_api_key() {
        let config = MailerConfig {
            provider: "resend".to_string(),
            api_key: None,
            ..MailerConfig::default()
        };
        assert!(matches!(from_config(&config), Err(MailerError::Configuration { .. })));
    }

    #[test]
    fn test_resend_with_key() {
        let config = MailerConfig {
            provider: "resend".to_string(),
            api_key: Some("re_live".to_string()),
            ..MailerConfig::default()
        };
        assert_eq!(from_config(&config).unwrap().name(), "resend");
    }

    #[test]
    fn test_unknown_provider() {
        let config = MailerConfig {
            provider: "carrier-pigeon".to_string(),
            ..MailerConfig::default()
        };
        let err = from_config(&config).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
