use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::SessionVerifier;
use crate::config::Config;
use crate::llm_client::LlmBackend;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Generative-AI backend. `LlmClient` in production.
    pub llm: Arc<dyn LlmBackend>,
    pub sessions: Arc<dyn SessionVerifier>,
    /// Applied to every AI generation endpoint, keyed by caller email.
    pub rate_limiter: RateLimiter,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State with a pool that never connects, for handlers that stay off the database.
    pub(crate) fn for_tests(
        llm: Arc<dyn LlmBackend>,
        sessions: Arc<dyn SessionVerifier>,
        max_requests: u64,
    ) -> Self {
        use std::time::Duration;

        use sqlx::postgres::PgPoolOptions;

        use crate::rate_limit::InMemoryRateLimitStore;

        let config = crate::config::test_config();
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        Self {
            db,
            llm,
            sessions,
            rate_limiter: RateLimiter::new(
                Arc::new(InMemoryRateLimitStore::new(config.rate_limit_sweep_threshold)),
                Duration::from_secs(config.rate_limit_window_secs),
                max_requests,
            ),
            config,
        }
    }
}
