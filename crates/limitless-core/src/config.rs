//! Configuration management for the Limitless back-office

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server-side settings, one section per concern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL pool
    #[serde(default)]
    pub database: DatabaseConfig,

    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Session and request limits
    #[serde(default)]
    pub security: SecurityConfig,

    /// Transactional email configuration
    #[serde(default)]
    pub mailer: MailerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Tokio worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// PostgreSQL pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Pool ceiling
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connections kept open while idle
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Seconds to wait for a free connection
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Seconds before an idle connection is closed
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Requests per minute allowed per client on public endpoints
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Page size used when a list request does not specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    /// Upper bound on the page size of list requests
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

/// Admin session and request guards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Require an admin session on `/api/admin` routes
    #[serde(default = "default_require_session")]
    pub require_session: bool,

    /// Seconds before a request is abandoned
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

/// Transactional email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Provider backend (`resend` or `mock`)
    #[serde(default = "default_mail_provider")]
    pub provider: String,

    /// Provider API base URL
    #[serde(default = "default_mail_base_url")]
    pub base_url: String,

    /// Provider API key
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Sender used when a request does not name one
    #[serde(default = "default_mail_from")]
    pub default_from: String,

    /// Provider request timeout in seconds
    #[serde(default = "default_mail_timeout")]
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `text`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log to file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// Defaults
fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(4)
}

fn default_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgresql://localhost/limitless".to_string())
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_connect_timeout() -> u64 {
    30
}

const fn default_idle_timeout() -> u64 {
    600
}

const fn default_rate_limit() -> u32 {
    60
}

const fn default_enable_cors() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

const fn default_page_size() -> i64 {
    50
}

const fn default_max_page_size() -> i64 {
    500
}

const fn default_require_session() -> bool {
    true
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_max_body_size() -> usize {
    1_048_576 // 1MB
}

fn default_mail_provider() -> String {
    "mock".to_string()
}

fn default_mail_base_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_mail_from() -> String {
    "Limitless Infotech <no-reply@limitlessinfotech.com>".to_string()
}

const fn default_mail_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rate_limit: default_rate_limit(),
            enable_cors: default_enable_cors(),
            cors_origins: default_cors_origins(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_session: default_require_session(),
            request_timeout: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            provider: default_mail_provider(),
            base_url: default_mail_base_url(),
            api_key: None,
            default_from: default_mail_from(),
            timeout_seconds: default_mail_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from an optional `config` file and `LIMITLESS_*` environment variables
    ///
    /// Nested keys use a double underscore, e.g. `LIMITLESS_DATABASE__URL`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] if a source is malformed.
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("LIMITLESS")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api.cors_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        config
            .try_deserialize()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })
    }

    /// Socket address string the API server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::field_reassign_with_default)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_serve_on_8080() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.server.workers > 0);

        assert!(config.database.url.starts_with("postgres"));
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 2);

        assert_eq!(config.api.rate_limit, 60);
        assert!(config.api.enable_cors);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.api.default_page_size, 50);
        assert_eq!(config.api.max_page_size, 500);

        assert!(config.security.require_session);
        assert_eq!(config.security.request_timeout, 30);

        assert_eq!(config.mailer.provider, "mock");
        assert!(config.mailer.api_key.is_none());

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let json_str = r#"{
            "server": {"host": "127.0.0.1"},
            "database": {"url": "postgresql://test"},
            "mailer": {"provider": "resend", "api_key": "re_123"}
        }"#;

        let config: Config = serde_json::from_str(json_str).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "postgresql://test");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.mailer.provider, "resend");
        assert_eq!(config.mailer.api_key.as_deref(), Some("re_123"));
        assert!(config.security.require_session);
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let mut config = Config::default();
        config.mailer.api_key = Some("re_secret".to_string());

        let serialized = serde_json::to_string(&config).unwrap();
        assert!(!serialized.contains("re_secret"));
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 3000;

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_config_bounds() {
        let config = Config::default();

        assert!(config.database.max_connections >= config.database.min_connections);
        assert!(config.api.default_page_size <= config.api.max_page_size);
        assert!(config.security.max_body_size > 0);
        assert!(config.mailer.timeout_seconds > 0);
    }
}
