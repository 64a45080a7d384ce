use anyhow::{Context, Result};

/// Hard-coded public host used when running in production without an override.
pub const PRODUCTION_BASE_URL: &str = "https://campus-lms.app";
/// Base URL for local development.
pub const LOCAL_BASE_URL: &str = "http://localhost:3000";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing. `ANTHROPIC_API_KEY` is
/// only required by the server, so `campus seed` runs without it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// When set, rate limiting is shared across instances through Redis.
    pub redis_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub rate_limit_max_requests: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_sweep_threshold: usize,
    pub job_scrape_delay_ms: u64,
    /// Lowercased emails allowed to call admin endpoints.
    pub admin_emails: Vec<String>,
    /// Resolved once at startup; used for shareable links.
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let explicit = optional_env("PUBLIC_BASE_URL");
        let platform = optional_env("PLATFORM_URL");
        let production = optional_env("APP_ENV").is_some_and(|v| v == "production");

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rate_limit_max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", 10)?,
            rate_limit_window_secs: parse_env("RATE_LIMIT_WINDOW_SECS", 60)?,
            rate_limit_sweep_threshold: parse_env("RATE_LIMIT_SWEEP_THRESHOLD", 1000)?,
            job_scrape_delay_ms: parse_env("JOB_SCRAPE_DELAY_MS", 800)?,
            admin_emails: parse_email_list(&std::env::var("ADMIN_EMAILS").unwrap_or_default()),
            base_url: resolve_base_url(explicit.as_deref(), platform.as_deref(), production),
        })
    }

    pub fn require_anthropic_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .context("Required environment variable 'ANTHROPIC_API_KEY' is not set")
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.admin_emails.iter().any(|a| *a == email)
    }
}

/// Picks the public base URL: explicit override, then the platform-provided
/// host, then the production fallback, then the local default.
pub fn resolve_base_url(explicit: Option<&str>, platform_host: Option<&str>, production: bool) -> String {
    let url = if let Some(url) = explicit.filter(|s| !s.trim().is_empty()) {
        url.trim().to_string()
    } else if let Some(host) = platform_host.filter(|s| !s.trim().is_empty()) {
        let host = host.trim();
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        }
    } else if production {
        PRODUCTION_BASE_URL.to_string()
    } else {
        LOCAL_BASE_URL.to_string()
    };
    url.trim_end_matches('/').to_string()
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/campus_test".to_string(),
        redis_url: None,
        anthropic_api_key: Some("test-key".to_string()),
        port: 0,
        rust_log: "info".to_string(),
        rate_limit_max_requests: 10,
        rate_limit_window_secs: 60,
        rate_limit_sweep_threshold: 1000,
        job_scrape_delay_ms: 0,
        admin_emails: vec!["admin@campus.test".to_string()],
        base_url: LOCAL_BASE_URL.to_string(),
    }
}
