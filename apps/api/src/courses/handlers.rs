//! Axum route handlers for courses and enrollments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::auth::AuthUser;
use crate::courses::{
    completed_from_value, find_course, find_enrollment, insert_course, list_published,
    normalize_completed, progress_percent, share_link,
};
use crate::errors::AppError;
use crate::generation::course_layout::{generate_layout, LayoutParams};
use crate::generation::non_blank;
use crate::models::course::{CourseRow, EnrollmentRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateCourseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub no_of_chapters: Option<usize>,
    pub include_video: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GenerateCourseResponse {
    pub success: bool,
    pub fallback: bool,
    pub course: CourseRow,
}

#[derive(Debug, Deserialize)]
pub struct CourseListQuery {
    /// `all` lists every published course instead of the caller's own.
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub course_content: Value,
}

#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub cid: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub already_enrolled: bool,
    pub enrollment: EnrollmentRow,
}

#[derive(Debug, Serialize)]
pub struct EnrolledCourse {
    pub course: CourseRow,
    pub completed_chapters: Vec<usize>,
    pub progress_percent: u32,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub completed_chapters: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub cid: String,
    pub completed_chapters: Vec<usize>,
    pub progress_percent: u32,
}

/// POST /api/courses/generate
pub async fn handle_generate_course(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<GenerateCourseRequest>,
) -> Result<(StatusCode, Json<GenerateCourseResponse>), AppError> {
    let name = non_blank(req.name)
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;

    state.rate_limiter.check_default(&user.email).await?;

    let params = LayoutParams::new(
        name,
        req.description,
        req.category,
        req.level,
        req.no_of_chapters,
        req.include_video,
    );
    let generated = generate_layout(state.llm.as_ref(), &params).await;
    let course = insert_course(&state.db, &generated.payload, &user.email).await?;
    info!(cid = %course.cid, user = %user.email, fallback = generated.fallback, "Course created");

    Ok((
        StatusCode::CREATED,
        Json(GenerateCourseResponse {
            success: !generated.fallback,
            fallback: generated.fallback,
            course,
        }),
    ))
}

/// GET /api/courses
pub async fn handle_list_courses(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CourseListQuery>,
) -> Result<Json<Vec<CourseRow>>, AppError> {
    let courses: Vec<CourseRow> = if query.scope.as_deref() == Some("all") {
        list_published(&state.db).await?
    } else {
        sqlx::query_as(
            "SELECT * FROM courses WHERE user_email = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(&user.email)
        .fetch_all(&state.db)
        .await?
    };
    Ok(Json(courses))
}

/// GET /api/courses/:cid
pub async fn handle_get_course(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(cid): Path<String>,
) -> Result<Json<CourseRow>, AppError> {
    Ok(Json(find_course(&state.db, &cid).await?))
}

/// PUT /api/courses/:cid/content
///
/// Only the course owner may replace its content.
pub async fn handle_update_content(
    State(state): State<AppState>,
    user: AuthUser,
    Path(cid): Path<String>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<CourseRow>, AppError> {
    if !req.course_content.is_array() {
        return Err(AppError::Validation(
            "course_content must be an array".to_string(),
        ));
    }

    let course = find_course(&state.db, &cid).await?;
    if !course.user_email.eq_ignore_ascii_case(&user.email) {
        return Err(AppError::Forbidden);
    }

    let updated: CourseRow =
        sqlx::query_as("UPDATE courses SET course_content = $1 WHERE cid = $2 RETURNING *")
            .bind(&req.course_content)
            .bind(&cid)
            .fetch_one(&state.db)
            .await?;
    Ok(Json(updated))
}

/// GET /api/courses/:cid/share-link
pub async fn handle_share_link(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(cid): Path<String>,
) -> Result<Json<ShareLinkResponse>, AppError> {
    let course = find_course(&state.db, &cid).await?;
    Ok(Json(ShareLinkResponse {
        url: share_link(&state.config.base_url, &course.cid),
        cid: course.cid,
    }))
}

/// POST /api/enrollments
pub async fn handle_enroll(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrollResponse>), AppError> {
    let cid = non_blank(req.course_id)
        .ok_or_else(|| AppError::Validation("course_id is required".to_string()))?;
    let course = find_course(&state.db, &cid).await?;

    let inserted: Option<EnrollmentRow> = sqlx::query_as(
        r#"
        INSERT INTO enrollments (cid, user_email)
        VALUES ($1, $2)
        ON CONFLICT (cid, user_email) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(&course.cid)
    .bind(&user.email)
    .fetch_optional(&state.db)
    .await?;

    match inserted {
        Some(enrollment) => {
            info!(cid = %course.cid, user = %user.email, "Enrolled");
            Ok((
                StatusCode::CREATED,
                Json(EnrollResponse {
                    already_enrolled: false,
                    enrollment,
                }),
            ))
        }
        None => {
            let enrollment = find_enrollment(&state.db, &course.cid, &user.email)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!("Enrollment vanished after conflict"))
                })?;
            Ok((
                StatusCode::OK,
                Json(EnrollResponse {
                    already_enrolled: true,
                    enrollment,
                }),
            ))
        }
    }
}

/// GET /api/enrollments
pub async fn handle_list_enrollments(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<EnrolledCourse>>, AppError> {
    let enrollments: Vec<EnrollmentRow> = sqlx::query_as(
        "SELECT * FROM enrollments WHERE user_email = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(&user.email)
    .fetch_all(&state.db)
    .await?;

    let cids: Vec<String> = enrollments.iter().map(|e| e.cid.clone()).collect();
    let courses: Vec<CourseRow> = sqlx::query_as("SELECT * FROM courses WHERE cid = ANY($1)")
        .bind(&cids)
        .fetch_all(&state.db)
        .await?;

    let enrolled = enrollments
        .into_iter()
        .filter_map(|enrollment| {
            let course = courses.iter().find(|c| c.cid == enrollment.cid)?.clone();
            let chapters = course.chapter_count();
            let completed = completed_from_value(&enrollment.completed_chapters);
            Some(EnrolledCourse {
                completed_chapters: normalize_completed(&completed, chapters),
                progress_percent: progress_percent(&completed, chapters),
                enrolled_at: enrollment.created_at,
                course,
            })
        })
        .collect();
    Ok(Json(enrolled))
}

/// PUT /api/enrollments/:cid/progress
pub async fn handle_update_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(cid): Path<String>,
    Json(req): Json<UpdateProgressRequest>,
) -> Result<Json<ProgressResponse>, AppError> {
    let course = find_course(&state.db, &cid).await?;
    if find_enrollment(&state.db, &cid, &user.email).await?.is_none() {
        return Err(AppError::NotFound(format!("Not enrolled in course {cid}")));
    }

    let chapters = course.chapter_count();
    let completed = normalize_completed(&req.completed_chapters, chapters);
    sqlx::query("UPDATE enrollments SET completed_chapters = $1 WHERE cid = $2 AND user_email = $3")
        .bind(serde_json::json!(completed))
        .bind(&cid)
        .bind(&user.email)
        .execute(&state.db)
        .await?;

    Ok(Json(ProgressResponse {
        progress_percent: progress_percent(&req.completed_chapters, chapters),
        completed_chapters: completed,
        cid,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::testing::StaticSessionVerifier;
    use crate::generation::testing::ScriptedLlm;
    use crate::routes::build_router;

    fn app() -> Router {
        let sessions = StaticSessionVerifier::default().with("tok", "author@campus.test");
        build_router(AppState::for_tests(Arc::new(ScriptedLlm::failing()), Arc::new(sessions), 10))
    }

    fn request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer tok")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn malformed_requests_are_rejected_before_the_database() {
        for (method, uri, body) in [
            ("POST", "/api/courses/generate", json!({"name": ""})),
            ("PUT", "/api/courses/abc/content", json!({"course_content": "not a list"})),
            ("POST", "/api/enrollments", json!({})),
        ] {
            let response = app().oneshot(request(method, uri, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn course_routes_require_a_session() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/courses")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
