//! Middleware for sessions, rate limiting, CORS and request logging

pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod session;

pub use cors::cors_layer;
pub use logging::request_logging_middleware;
pub use rate_limit::rate_limit_middleware;
pub use session::require_admin_session;
