//! Axum route handlers for the job board.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::jobs::{scrape_jobs, RankedJob};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    /// Comma-separated skills, e.g. `react,node`.
    pub skills: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<RankedJob>,
    pub total: usize,
    pub ranked: bool,
}

/// GET /api/jobs?skills=react,node
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<JobsQuery>,
) -> Result<Json<JobsResponse>, AppError> {
    let skills = parse_skills(query.skills.as_deref());
    let delay = Duration::from_millis(state.config.job_scrape_delay_ms);
    let jobs = scrape_jobs(&skills, delay).await;
    Ok(Json(JobsResponse {
        total: jobs.len(),
        ranked: !skills.is_empty(),
        jobs,
    }))
}

fn parse_skills(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
