//! Quiz generation from an exam paper or a free-form topic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::generation::fallback::SAMPLE_QUESTIONS;
use crate::generation::prompts::{QUIZ_FROM_PAPER_TEMPLATE, QUIZ_FROM_TOPIC_TEMPLATE};
use crate::generation::{
    generate_or_fallback, non_blank, truncate_chars, Difficulty, GenerationError, Generated,
};
use crate::llm_client::prompts::ACCURACY_INSTRUCTION;
use crate::llm_client::LlmBackend;

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_QUESTION_COUNT: usize = 20;
/// Papers longer than this are cut before prompting.
const MAX_PAPER_CHARS: usize = 12_000;
const MINUTES_PER_QUESTION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizSource {
    Paper,
    Topic,
}

/// Validated generation parameters.
#[derive(Debug, Clone)]
pub struct QuizParams {
    pub source: QuizSource,
    /// Topic for topic quizzes, subject label for paper quizzes.
    pub subject: String,
    pub category: String,
    /// Paper text; only used for `QuizSource::Paper`.
    pub material: Option<String>,
    pub num_questions: usize,
    pub difficulty: Difficulty,
}

impl QuizParams {
    pub fn from_topic(
        topic: String,
        category: Option<String>,
        num_questions: Option<usize>,
        difficulty: Option<Difficulty>,
    ) -> Self {
        Self {
            source: QuizSource::Topic,
            subject: topic,
            category: non_blank(category).unwrap_or_else(|| "general".to_string()),
            material: None,
            num_questions: clamp_count(num_questions),
            difficulty: difficulty.unwrap_or_default(),
        }
    }

    pub fn from_paper(
        paper_text: String,
        subject: Option<String>,
        num_questions: Option<usize>,
        difficulty: Option<Difficulty>,
    ) -> Self {
        Self {
            source: QuizSource::Paper,
            subject: non_blank(subject).unwrap_or_else(|| "Exam Paper".to_string()),
            category: "exam preparation".to_string(),
            material: Some(paper_text),
            num_questions: clamp_count(num_questions),
            difficulty: difficulty.unwrap_or_default(),
        }
    }
}

fn clamp_count(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub points: u32,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub source: QuizSource,
    pub subject: String,
    pub difficulty: Difficulty,
    pub questions: Vec<QuizQuestion>,
    pub total_points: u32,
    pub time_limit_minutes: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RawQuiz {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

/// Model output before backfill. Loosely typed fields tolerate numbers
/// arriving as strings and answers given as letters or option text.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: Option<Value>,
    question: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: Option<Value>,
    explanation: Option<String>,
    difficulty: Option<String>,
    points: Option<Value>,
    topic: Option<String>,
}

pub async fn generate_quiz(llm: &dyn LlmBackend, params: &QuizParams) -> Generated<Quiz> {
    let prompt = build_prompt(params);
    let kind = match params.source {
        QuizSource::Paper => "quiz_from_paper",
        QuizSource::Topic => "quiz_from_topic",
    };
    generate_or_fallback(
        llm,
        kind,
        &prompt,
        |raw: RawQuiz| finish_quiz(params, raw),
        || fallback_quiz(params),
    )
    .await
}

fn build_prompt(params: &QuizParams) -> String {
    let template = match params.source {
        QuizSource::Paper => QUIZ_FROM_PAPER_TEMPLATE,
        QuizSource::Topic => QUIZ_FROM_TOPIC_TEMPLATE,
    };
    let paper = params.material.as_deref().unwrap_or_default();
    template
        .replace("{accuracy_instruction}", ACCURACY_INSTRUCTION)
        .replace("{num_questions}", &params.num_questions.to_string())
        .replace("{difficulty}", params.difficulty.as_str())
        .replace("{subject}", &params.subject)
        .replace("{topic}", &params.subject)
        .replace("{category}", &params.category)
        .replace("{paper_text}", truncate_chars(paper, MAX_PAPER_CHARS))
}

fn finish_quiz(params: &QuizParams, raw: RawQuiz) -> Result<Quiz, GenerationError> {
    let questions: Vec<QuizQuestion> = raw
        .questions
        .into_iter()
        .filter_map(|q| finish_question(q, params.difficulty))
        .take(params.num_questions)
        .enumerate()
        .map(|(i, mut q)| {
            if q.id.is_empty() {
                q.id = format!("q{}", i + 1);
            }
            q
        })
        .collect();

    if questions.is_empty() {
        return Err(GenerationError::Empty("questions"));
    }

    Ok(assemble(
        params,
        non_blank(raw.title).unwrap_or_else(|| default_title(params)),
        non_blank(raw.description).unwrap_or_else(|| default_description(params)),
        questions,
    ))
}

/// Backfills one question; returns `None` when it cannot be answered.
fn finish_question(raw: RawQuestion, default_difficulty: Difficulty) -> Option<QuizQuestion> {
    let question = non_blank(raw.question)?;
    let options: Vec<String> = raw
        .options
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if options.len() < 2 {
        return None;
    }
    let correct_answer = resolve_answer(raw.correct_answer.as_ref()?, &options)?;
    let difficulty = raw
        .difficulty
        .as_deref()
        .and_then(Difficulty::parse_lenient)
        .unwrap_or(default_difficulty);
    let points = raw
        .points
        .as_ref()
        .and_then(value_as_u64)
        .and_then(|p| u32::try_from(p).ok())
        .filter(|p| *p > 0)
        .unwrap_or_else(|| difficulty.default_points());

    Some(QuizQuestion {
        id: raw.id.as_ref().map(value_as_id).unwrap_or_default(),
        question,
        options,
        correct_answer,
        explanation: non_blank(raw.explanation).unwrap_or_default(),
        difficulty,
        points,
        topic: non_blank(raw.topic),
    })
}

/// Maps an index, a letter ("B") or the option text itself to an option index.
fn resolve_answer(answer: &Value, options: &[String]) -> Option<usize> {
    let index = match answer {
        Value::Number(_) => value_as_u64(answer).and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<usize>() {
                Some(n)
            } else if s.len() == 1 && s.chars().all(|c| c.is_ascii_alphabetic()) {
                let letter = s.to_ascii_uppercase().as_bytes()[0];
                Some(usize::from(letter - b'A'))
            } else {
                options.iter().position(|o| o.eq_ignore_ascii_case(s))
            }
        }
        _ => None,
    }?;
    (index < options.len()).then_some(index)
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => format!("q{n}"),
        _ => String::new(),
    }
}

fn default_title(params: &QuizParams) -> String {
    format!("{} Quiz", params.subject)
}

fn default_description(params: &QuizParams) -> String {
    format!(
        "{} {} questions on {}.",
        params.num_questions,
        params.difficulty.as_str(),
        params.subject
    )
}

fn assemble(params: &QuizParams, title: String, description: String, questions: Vec<QuizQuestion>) -> Quiz {
    let total_points = questions.iter().map(|q| q.points).sum();
    let count = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    Quiz {
        id: Uuid::new_v4(),
        title,
        description,
        source: params.source,
        subject: params.subject.clone(),
        difficulty: params.difficulty,
        time_limit_minutes: count.saturating_mul(MINUTES_PER_QUESTION),
        total_points,
        questions,
        created_at: Utc::now(),
    }
}

/// Sample questions, relabelled with the requested difficulty.
pub fn fallback_quiz(params: &QuizParams) -> Quiz {
    let questions = SAMPLE_QUESTIONS
        .iter()
        .take(params.num_questions)
        .enumerate()
        .map(|(i, (question, options, correct, explanation, topic))| QuizQuestion {
            id: format!("q{}", i + 1),
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: *correct,
            explanation: explanation.to_string(),
            difficulty: params.difficulty,
            points: params.difficulty.default_points(),
            topic: Some(topic.to_string()),
        })
        .collect();
    assemble(
        params,
        format!("{} Practice Quiz", params.subject),
        "General engineering practice questions while personalised questions are unavailable."
            .to_string(),
        questions,
    )
}
