mod auth;
mod config;
mod courses;
mod db;
mod errors;
mod generation;
mod jobs;
mod llm_client;
mod models;
mod portal;
mod rate_limit;
mod routes;
mod seed;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::PgSessionVerifier;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::LlmClient;
use crate::rate_limit::{InMemoryRateLimitStore, RateLimitStore, RateLimiter, RedisRateLimitStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Campus API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // `campus seed` loads reference data and exits.
    if std::env::args().nth(1).as_deref() == Some("seed") {
        let reports = seed::run_seed(&db).await?;
        for report in &reports {
            println!(
                "{:<22} upserted {:>3}  failed {:>3}",
                report.table, report.upserted, report.failed
            );
        }
        return Ok(());
    }

    let rate_limiter = RateLimiter::new(
        build_rate_limit_store(&config)?,
        Duration::from_secs(config.rate_limit_window_secs),
        config.rate_limit_max_requests,
    );

    let llm = LlmClient::new(config.require_anthropic_key()?.to_string())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        sessions: Arc::new(PgSessionVerifier::new(db.clone())),
        db,
        llm: Arc::new(llm),
        rate_limiter,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr} (public base URL {})", config.base_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis-backed when `REDIS_URL` is set, otherwise process-local.
fn build_rate_limit_store(config: &Config) -> Result<Arc<dyn RateLimitStore>> {
    let memory = InMemoryRateLimitStore::new(config.rate_limit_sweep_threshold);
    match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
            info!("Rate limiting through Redis");
            Ok(Arc::new(RedisRateLimitStore::new(client, memory)))
        }
        None => {
            info!("Rate limiting in memory (single instance)");
            Ok(Arc::new(memory))
        }
    }
}
