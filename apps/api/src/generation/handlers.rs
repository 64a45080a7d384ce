//! Axum route handlers for the Generation API.
//!
//! Handlers validate input, charge the caller's rate limit, and then always
//! answer 200: AI failures surface as `fallback: true` payloads.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::generation::discovery::{
    generate_cards, generate_details, CardParams, DetailParams, DiscoveryCard, DiscoveryDetails,
};
use crate::generation::quiz::{generate_quiz, Quiz, QuizParams};
use crate::generation::{non_blank, Difficulty, Generated};
use crate::state::AppState;

/// Uploaded exam papers may be up to this size.
pub const MAX_PAPER_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QuizFromPaperRequest {
    pub paper_id: Option<String>,
    pub paper_text: Option<String>,
    pub subject: Option<String>,
    pub num_questions: Option<usize>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizFromTopicRequest {
    pub topic: Option<String>,
    pub category: Option<String>,
    pub num_questions: Option<usize>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiscoveryCardsRequest {
    pub category: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DiscoveryDetailsRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub success: bool,
    pub fallback: bool,
    pub quiz: Quiz,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryCardsResponse {
    pub success: bool,
    pub fallback: bool,
    pub category: String,
    pub cards: Vec<DiscoveryCard>,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryDetailsResponse {
    pub success: bool,
    pub fallback: bool,
    pub details: DiscoveryDetails,
}

impl From<Generated<Quiz>> for QuizResponse {
    fn from(generated: Generated<Quiz>) -> Self {
        Self {
            success: !generated.fallback,
            fallback: generated.fallback,
            quiz: generated.payload,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/quiz/from-paper
///
/// Builds a practice quiz from a stored paper (`paper_id`) or pasted text.
pub async fn handle_quiz_from_paper(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<QuizFromPaperRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    let difficulty = parse_difficulty(request.difficulty.as_deref())?;

    let (paper_text, subject) = match (non_blank(request.paper_id), non_blank(request.paper_text)) {
        (Some(paper_id), _) => {
            let (text, subject_code) = load_paper_text(&state, &paper_id).await?;
            (text, non_blank(request.subject).or(Some(subject_code)))
        }
        (None, Some(text)) => (text, request.subject),
        (None, None) => {
            return Err(AppError::Validation(
                "Either paper_id or paper_text is required".to_string(),
            ))
        }
    };

    state.rate_limiter.check_default(&user.email).await?;

    let params = QuizParams::from_paper(paper_text, subject, request.num_questions, difficulty);
    info!(user = %user.email, subject = %params.subject, "Generating quiz from paper");
    Ok(Json(generate_quiz(state.llm.as_ref(), &params).await.into()))
}

/// POST /api/quiz/from-paper/upload
///
/// Multipart form: `file` (PDF) plus optional `subject`, `num_questions`, `difficulty`.
pub async fn handle_quiz_from_paper_upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<QuizResponse>, AppError> {
    let mut pdf: Option<Bytes> = None;
    let mut subject = None;
    let mut num_questions = None;
    let mut difficulty = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                pdf = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error("Failed to read file", e))?,
                )
            }
            "subject" | "num_questions" | "difficulty" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(&format!("Invalid field '{name}'"), e))?;
                match name.as_str() {
                    "subject" => subject = Some(text),
                    "num_questions" => {
                        num_questions = Some(text.trim().parse::<usize>().map_err(|_| {
                            AppError::Validation("num_questions must be a positive integer".to_string())
                        })?)
                    }
                    _ => difficulty = Some(text),
                }
            }
            _ => {}
        }
    }

    let pdf = pdf
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("A PDF file is required".to_string()))?;
    let difficulty = parse_difficulty(difficulty.as_deref())?;

    state.rate_limiter.check_default(&user.email).await?;

    let paper_text = extract_pdf_text(pdf).await?;
    let params = QuizParams::from_paper(paper_text, subject, num_questions, difficulty);
    info!(user = %user.email, subject = %params.subject, "Generating quiz from uploaded paper");
    Ok(Json(generate_quiz(state.llm.as_ref(), &params).await.into()))
}

/// Bodies cut off by the upload limit become 413, anything else malformed 400.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Uploads are limited to {} MB",
            MAX_PAPER_UPLOAD_BYTES / (1024 * 1024)
        ))
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

/// POST /api/quiz/from-topic
pub async fn handle_quiz_from_topic(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<QuizFromTopicRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    let topic = non_blank(request.topic)
        .ok_or_else(|| AppError::Validation("topic is required".to_string()))?;
    let difficulty = parse_difficulty(request.difficulty.as_deref())?;

    state.rate_limiter.check_default(&user.email).await?;

    let params = QuizParams::from_topic(topic, request.category, request.num_questions, difficulty);
    info!(user = %user.email, topic = %params.subject, "Generating quiz from topic");
    Ok(Json(generate_quiz(state.llm.as_ref(), &params).await.into()))
}

/// POST /api/discovery/cards
pub async fn handle_discovery_cards(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<DiscoveryCardsRequest>,
) -> Result<Json<DiscoveryCardsResponse>, AppError> {
    state.rate_limiter.check_default(&user.email).await?;

    let params = CardParams::new(request.category, request.count);
    let generated = generate_cards(state.llm.as_ref(), &params).await;
    Ok(Json(DiscoveryCardsResponse {
        success: !generated.fallback,
        fallback: generated.fallback,
        category: params.category,
        cards: generated.payload,
    }))
}

/// POST /api/discovery/details
pub async fn handle_discovery_details(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<DiscoveryDetailsRequest>,
) -> Result<Json<DiscoveryDetailsResponse>, AppError> {
    let title = non_blank(request.title)
        .ok_or_else(|| AppError::Validation("title is required".to_string()))?;

    state.rate_limiter.check_default(&user.email).await?;

    let params = DetailParams::new(title, request.category, request.summary);
    let generated = generate_details(state.llm.as_ref(), &params).await;
    Ok(Json(DiscoveryDetailsResponse {
        success: !generated.fallback,
        fallback: generated.fallback,
        details: generated.payload,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn parse_difficulty(raw: Option<&str>) -> Result<Option<Difficulty>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Difficulty::parse_lenient(s).map(Some).ok_or_else(|| {
            AppError::Validation(format!("difficulty must be easy, medium or hard (got '{s}')"))
        }),
    }
}

/// Loads a stored paper's extracted questions as prompt text, with its subject code.
async fn load_paper_text(state: &AppState, paper_id: &str) -> Result<(String, String), AppError> {
    let row: Option<(Value, String)> = sqlx::query_as(
        "SELECT extracted_questions, subject_code FROM question_papers WHERE paper_id = $1",
    )
    .bind(paper_id)
    .fetch_optional(&state.db)
    .await?;

    let (questions, subject_code) =
        row.ok_or_else(|| AppError::NotFound(format!("Question paper {paper_id} not found")))?;
    let text = paper_text_from_questions(&questions);
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Question paper {paper_id} has no extracted questions"
        )));
    }
    Ok((text, subject_code))
}

/// Renders an `extracted_questions` blob (strings or `{question, marks}`
/// objects) as a numbered list.
fn paper_text_from_questions(questions: &Value) -> String {
    questions
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|q| match q {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(o) => {
                        let text = o.get("question")?.as_str()?;
                        Some(match o.get("marks").and_then(Value::as_u64) {
                            Some(marks) => format!("{text} [{marks} marks]"),
                            None => text.to_string(),
                        })
                    }
                    _ => None,
                })
                .enumerate()
                .map(|(i, q)| format!("{}. {}", i + 1, q))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

async fn extract_pdf_text(pdf: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read text from the PDF: {e}")))?;
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "The PDF contains no extractable text".to_string(),
        ));
    }
    Ok(text)
}
