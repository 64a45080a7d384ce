use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::seed::{run_seed, SeedReport};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub reports: Vec<SeedReport>,
}

/// POST /api/admin/seed
///
/// Restricted to `ADMIN_EMAILS`.
pub async fn handle_admin_seed(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SeedResponse>, AppError> {
    if !state.config.is_admin(&user.email) {
        return Err(AppError::Forbidden);
    }
    info!(admin = %user.email, "Seeding reference data");
    let reports = run_seed(&state.db).await?;
    Ok(Json(SeedResponse { reports }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::auth::testing::StaticSessionVerifier;
    use crate::generation::testing::ScriptedLlm;
    use crate::routes::build_router;
    use crate::state::AppState;

    #[tokio::test]
    async fn non_admins_cannot_seed() {
        let sessions = StaticSessionVerifier::default().with("tok", "student@campus.test");
        let app = build_router(AppState::for_tests(Arc::new(ScriptedLlm::failing()), Arc::new(sessions), 10));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/admin/seed")
                    .header(header::AUTHORIZATION, "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
