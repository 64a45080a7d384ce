//! Axum route handlers for the branch portal and user profile.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::generation::non_blank;
use crate::models::portal::{
    BranchSubjectRow, EngineeringBranchRow, MockExamRow, QuestionPaperRow, SubjectProgressRow,
    UserBranchRow,
};
use crate::models::user::UserRow;
use crate::portal::{
    branch_progress, normalize_code, parse_questions, record_topic, score_submission,
    strip_answers, topic_percent, validate_semester, BranchProgress, ExamScore, PublicQuestion,
    SubjectProgress,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubjectsQuery {
    pub semester: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct PapersQuery {
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub paper_id: String,
    pub pdf_url: Option<String>,
    pub download_count: i32,
}

#[derive(Debug, Deserialize)]
pub struct MockExamQuery {
    pub branch: Option<String>,
    pub subject: Option<String>,
}

/// A mock exam listing entry; questions are omitted.
#[derive(Debug, Serialize)]
pub struct MockExamSummary {
    pub exam_id: String,
    pub title: String,
    pub branch_code: String,
    pub subject_code: String,
    pub source_years: Vec<i32>,
    pub total_questions: i32,
    pub total_marks: i32,
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize)]
pub struct MockExamView {
    #[serde(flatten)]
    pub summary: MockExamSummary,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    pub answers: Vec<Option<usize>>,
}

#[derive(Debug, Serialize)]
pub struct SubmitExamResponse {
    pub exam_id: String,
    #[serde(flatten)]
    pub result: ExamScore,
}

#[derive(Debug, Deserialize)]
pub struct UserBranchRequest {
    pub branch_code: Option<String>,
    pub semester: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordProgressRequest {
    pub branch_code: Option<String>,
    pub subject_code: Option<String>,
    pub completed_topic: Option<String>,
    pub total_topics: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertUserRequest {
    pub name: Option<String>,
}

impl From<&MockExamRow> for MockExamSummary {
    fn from(row: &MockExamRow) -> Self {
        Self {
            exam_id: row.exam_id.clone(),
            title: row.title.clone(),
            branch_code: row.branch_code.clone(),
            subject_code: row.subject_code.clone(),
            source_years: row.source_years.clone(),
            total_questions: row.total_questions,
            total_marks: row.total_marks,
            duration_minutes: row.duration_minutes,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Branches, subjects, papers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/branches
pub async fn handle_list_branches(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<EngineeringBranchRow>>, AppError> {
    let branches: Vec<EngineeringBranchRow> =
        sqlx::query_as("SELECT * FROM engineering_branches ORDER BY code")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(branches))
}

/// GET /api/branches/:code/subjects?semester=N
pub async fn handle_list_subjects(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Query(query): Query<SubjectsQuery>,
) -> Result<Json<Vec<BranchSubjectRow>>, AppError> {
    let semester = query.semester.map(validate_semester).transpose()?;
    let subjects: Vec<BranchSubjectRow> = sqlx::query_as(
        r#"
        SELECT * FROM branch_subjects
        WHERE branch_code = $1 AND ($2::INT IS NULL OR semester = $2)
        ORDER BY semester, subject_code
        "#,
    )
    .bind(normalize_code(&code))
    .bind(semester)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(subjects))
}

/// GET /api/branches/:code/papers?subject=CODE
pub async fn handle_list_papers(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Query(query): Query<PapersQuery>,
) -> Result<Json<Vec<QuestionPaperRow>>, AppError> {
    let subject = non_blank(query.subject).map(|s| normalize_code(&s));
    let papers: Vec<QuestionPaperRow> = sqlx::query_as(
        r#"
        SELECT * FROM question_papers
        WHERE branch_code = $1 AND ($2::TEXT IS NULL OR subject_code = $2)
        ORDER BY exam_year DESC, paper_id
        "#,
    )
    .bind(normalize_code(&code))
    .bind(subject)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(papers))
}

/// GET /api/papers/:paper_id/download
pub async fn handle_download_paper(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(paper_id): Path<String>,
) -> Result<Json<DownloadResponse>, AppError> {
    let row: Option<(Option<String>, i32)> = sqlx::query_as(
        r#"
        UPDATE question_papers
        SET download_count = download_count + 1
        WHERE paper_id = $1
        RETURNING pdf_url, download_count
        "#,
    )
    .bind(&paper_id)
    .fetch_optional(&state.db)
    .await?;

    let (pdf_url, download_count) =
        row.ok_or_else(|| AppError::NotFound(format!("Question paper {paper_id} not found")))?;
    Ok(Json(DownloadResponse {
        paper_id,
        pdf_url,
        download_count,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Mock exams
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/mock-exams?branch=CODE&subject=CODE
pub async fn handle_list_mock_exams(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<MockExamQuery>,
) -> Result<Json<Vec<MockExamSummary>>, AppError> {
    let rows: Vec<MockExamRow> = sqlx::query_as(
        r#"
        SELECT * FROM mock_exams
        WHERE is_public
          AND ($1::TEXT IS NULL OR branch_code = $1)
          AND ($2::TEXT IS NULL OR subject_code = $2)
        ORDER BY created_at DESC, exam_id
        "#,
    )
    .bind(non_blank(query.branch).map(|b| normalize_code(&b)))
    .bind(non_blank(query.subject).map(|s| normalize_code(&s)))
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows.iter().map(MockExamSummary::from).collect()))
}

/// GET /api/mock-exams/:exam_id
pub async fn handle_get_mock_exam(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(exam_id): Path<String>,
) -> Result<Json<MockExamView>, AppError> {
    let exam = find_public_exam(&state, &exam_id).await?;
    let questions = parse_questions(&exam.questions)?;
    Ok(Json(MockExamView {
        summary: MockExamSummary::from(&exam),
        questions: strip_answers(&questions),
    }))
}

/// POST /api/mock-exams/:exam_id/submit
pub async fn handle_submit_mock_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path(exam_id): Path<String>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<Json<SubmitExamResponse>, AppError> {
    let exam = find_public_exam(&state, &exam_id).await?;
    let questions = parse_questions(&exam.questions)?;
    let result = score_submission(&questions, &req.answers);
    info!(exam = %exam_id, user = %user.email, score = result.score, "Mock exam submitted");
    Ok(Json(SubmitExamResponse { exam_id, result }))
}

async fn find_public_exam(state: &AppState, exam_id: &str) -> Result<MockExamRow, AppError> {
    sqlx::query_as::<_, MockExamRow>("SELECT * FROM mock_exams WHERE exam_id = $1 AND is_public")
        .bind(exam_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Mock exam {exam_id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// User branch and progress
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/user/branch
pub async fn handle_get_user_branch(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserBranchRow>, AppError> {
    find_user_branch(&state, &user.email)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No branch selected".to_string()))
}

/// PUT /api/user/branch
pub async fn handle_set_user_branch(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UserBranchRequest>,
) -> Result<Json<UserBranchRow>, AppError> {
    let code = non_blank(req.branch_code)
        .map(|c| normalize_code(&c))
        .ok_or_else(|| AppError::Validation("branch_code is required".to_string()))?;
    let semester = validate_semester(
        req.semester
            .ok_or_else(|| AppError::Validation("semester is required".to_string()))?,
    )?;

    let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM engineering_branches WHERE code = $1")
        .bind(&code)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!("Branch {code} not found")));
    }

    let row: UserBranchRow = sqlx::query_as(
        r#"
        INSERT INTO user_branches (user_email, branch_code, semester)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_email) DO UPDATE
            SET branch_code = EXCLUDED.branch_code,
                semester = EXCLUDED.semester,
                updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&user.email)
    .bind(&code)
    .bind(semester)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

/// GET /api/progress?branch=CODE
///
/// Without `branch`, reports on the caller's saved branch.
pub async fn handle_get_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<BranchProgress>, AppError> {
    let branch_code = match non_blank(query.branch) {
        Some(code) => normalize_code(&code),
        None => find_user_branch(&state, &user.email)
            .await?
            .map(|b| b.branch_code)
            .ok_or_else(|| {
                AppError::Validation("branch is required when no branch is saved".to_string())
            })?,
    };

    let rows: Vec<SubjectProgressRow> = sqlx::query_as(
        "SELECT * FROM subject_progress WHERE user_email = $1 AND branch_code = $2 ORDER BY subject_code",
    )
    .bind(&user.email)
    .bind(&branch_code)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(branch_progress(branch_code, rows)))
}

/// POST /api/progress
pub async fn handle_record_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<RecordProgressRequest>,
) -> Result<Json<SubjectProgress>, AppError> {
    let required = |value: Option<String>, field: &str| {
        non_blank(value).ok_or_else(|| AppError::Validation(format!("{field} is required")))
    };
    let branch_code = normalize_code(&required(req.branch_code, "branch_code")?);
    let subject_code = normalize_code(&required(req.subject_code, "subject_code")?);
    let topic = required(req.completed_topic, "completed_topic")?;
    let total_topics = match req.total_topics {
        Some(n) if n > 0 => n,
        _ => {
            return Err(AppError::Validation(
                "total_topics must be a positive integer".to_string(),
            ))
        }
    };

    let row = record_topic(
        &state.db,
        &user.email,
        &branch_code,
        &subject_code,
        &topic,
        total_topics,
    )
    .await?;

    Ok(Json(SubjectProgress {
        percent: topic_percent(row.completed_topics.len(), row.total_topics),
        subject_code: row.subject_code,
        completed_topics: row.completed_topics,
        total_topics: row.total_topics,
    }))
}

async fn find_user_branch(state: &AppState, email: &str) -> Result<Option<UserBranchRow>, AppError> {
    let row: Option<UserBranchRow> =
        sqlx::query_as("SELECT * FROM user_branches WHERE user_email = $1")
            .bind(email)
            .fetch_optional(&state.db)
            .await?;
    Ok(row)
}

// ────────────────────────────────────────────────────────────────────────────
// Users
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/users
///
/// Records the caller; an existing row keeps its name unless a new one is given.
pub async fn handle_upsert_user(
    State(state): State<AppState>,
    user: AuthUser,
    body: Option<Json<UpsertUserRequest>>,
) -> Result<Json<UserRow>, AppError> {
    let name = body.and_then(|Json(b)| non_blank(b.name)).or(user.name);
    let row: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (email, name)
        VALUES ($1, $2)
        ON CONFLICT (email) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, users.name)
        RETURNING *
        "#,
    )
    .bind(&user.email)
    .bind(name)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::testing::StaticSessionVerifier;
    use crate::generation::testing::ScriptedLlm;
    use crate::routes::build_router;
    use crate::state::AppState;

    fn app() -> Router {
        let sessions = StaticSessionVerifier::default().with("tok", "student@campus.test");
        build_router(AppState::for_tests(Arc::new(ScriptedLlm::failing()), Arc::new(sessions), 10))
    }

    async fn error_code(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        body["error"]["code"].as_str().unwrap_or_default().to_string()
    }

    fn authed(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer tok")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn out_of_range_semester_is_bad_request() {
        let response = app()
            .oneshot(authed("PUT", "/api/user/branch", json!({"branch_code": "CSE", "semester": 9})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "VALIDATION_ERROR");

        let response = app()
            .oneshot(authed("GET", "/api/branches/CSE/subjects?semester=0", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn progress_requires_positive_topic_total() {
        let response = app()
            .oneshot(authed(
                "POST",
                "/api/progress",
                json!({"branch_code": "CSE", "subject_code": "CS201", "completed_topic": "Trees", "total_topics": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn portal_requires_a_session() {
        let response = app()
            .oneshot(Request::builder().uri("/api/branches").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "UNAUTHORIZED");
    }
}
