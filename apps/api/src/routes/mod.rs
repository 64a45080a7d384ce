pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::courses::handlers as courses;
use crate::generation::handlers::{self as generation, MAX_PAPER_UPLOAD_BYTES};
use crate::jobs::handlers as jobs;
use crate::portal::handlers as portal;
use crate::seed::handlers as seed;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI generation (rate limited)
        .route("/api/quiz/from-paper", post(generation::handle_quiz_from_paper))
        .route(
            "/api/quiz/from-paper/upload",
            post(generation::handle_quiz_from_paper_upload)
                .layer(DefaultBodyLimit::max(MAX_PAPER_UPLOAD_BYTES)),
        )
        .route("/api/quiz/from-topic", post(generation::handle_quiz_from_topic))
        .route("/api/discovery/cards", post(generation::handle_discovery_cards))
        .route("/api/discovery/details", post(generation::handle_discovery_details))
        .route("/api/courses/generate", post(courses::handle_generate_course))
        // Courses and enrollments
        .route("/api/courses", get(courses::handle_list_courses))
        .route("/api/courses/:cid", get(courses::handle_get_course))
        .route("/api/courses/:cid/content", put(courses::handle_update_content))
        .route("/api/courses/:cid/share-link", get(courses::handle_share_link))
        .route(
            "/api/enrollments",
            get(courses::handle_list_enrollments).post(courses::handle_enroll),
        )
        .route(
            "/api/enrollments/:cid/progress",
            put(courses::handle_update_progress),
        )
        // Jobs
        .route("/api/jobs", get(jobs::handle_list_jobs))
        // Branch portal
        .route("/api/branches", get(portal::handle_list_branches))
        .route("/api/branches/:code/subjects", get(portal::handle_list_subjects))
        .route("/api/branches/:code/papers", get(portal::handle_list_papers))
        .route("/api/papers/:paper_id/download", get(portal::handle_download_paper))
        .route("/api/mock-exams", get(portal::handle_list_mock_exams))
        .route("/api/mock-exams/:exam_id", get(portal::handle_get_mock_exam))
        .route(
            "/api/mock-exams/:exam_id/submit",
            post(portal::handle_submit_mock_exam),
        )
        .route(
            "/api/user/branch",
            get(portal::handle_get_user_branch).put(portal::handle_set_user_branch),
        )
        .route(
            "/api/progress",
            get(portal::handle_get_progress).post(portal::handle_record_progress),
        )
        .route("/api/users", post(portal::handle_upsert_user))
        // Admin
        .route("/api/admin/seed", post(seed::handle_admin_seed))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::testing::StaticSessionVerifier;
    use crate::generation::testing::ScriptedLlm;

    #[tokio::test]
    async fn health_is_public() {
        let app = build_router(AppState::for_tests(
            Arc::new(ScriptedLlm::failing()),
            Arc::new(StaticSessionVerifier::default()),
            10,
        ));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "campus-api");
    }
}
