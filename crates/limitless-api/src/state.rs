//! Application state management

use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use limitless_core::Config;
use limitless_database::PgPool;
use limitless_mailer::EmailDispatcher;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Database connection pool
    pub pool: PgPool,
    /// Outbound email backend
    pub mailer: Arc<dyn EmailDispatcher>,
    /// Per-client limiters for the public endpoints
    rate_limiters: Arc<DashMap<String, Arc<DefaultDirectRateLimiter>>>,
    /// Process start, for uptime reporting
    started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("mailer", &self.mailer.name())
            .field("rate_limited_clients", &self.rate_limiters.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state
    #[must_use]
    pub fn new(config: Config, pool: PgPool, mailer: Arc<dyn EmailDispatcher>) -> Self {
        Self {
            config,
            pool,
            mailer,
            rate_limiters: Arc::new(DashMap::new()),
            started_at: Instant::now(),
        }
    }

    /// Limiter for `client_key`, created on first use from `api.rate_limit`
    #[must_use]
    pub fn rate_limiter(&self, client_key: &str) -> Arc<DefaultDirectRateLimiter> {
        self.rate_limiters
            .entry(client_key.to_string())
            .or_insert_with(|| {
                let per_minute =
                    NonZeroU32::new(self.config.api.rate_limit).unwrap_or(NonZeroU32::MIN);
                Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)))
            })
            .clone()
    }

    /// Seconds since the state was created
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
