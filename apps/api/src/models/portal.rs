use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EngineeringBranchRow {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: String,
    pub subjects: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BranchSubjectRow {
    pub id: i32,
    pub branch_code: String,
    pub subject_code: String,
    pub subject_name: String,
    pub semester: i32,
    pub credits: i32,
    pub is_core: bool,
    pub prerequisites: Value,
    pub syllabus: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionPaperRow {
    pub id: i32,
    pub paper_id: String,
    pub branch_code: String,
    pub subject_code: String,
    pub university: String,
    pub exam_year: i32,
    pub exam_type: String,
    pub pdf_url: Option<String>,
    pub extracted_questions: Value,
    pub difficulty: String,
    pub total_marks: i32,
    pub duration_minutes: i32,
    pub uploaded_by: String,
    pub download_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MockExamRow {
    pub id: i32,
    pub exam_id: String,
    pub title: String,
    pub branch_code: String,
    pub subject_code: String,
    pub source_years: Vec<i32>,
    /// JSON array of `MockQuestion`.
    pub questions: Value,
    pub total_questions: i32,
    pub total_marks: i32,
    pub duration_minutes: i32,
    pub created_by: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

/// One question embedded in a mock exam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MockQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub marks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserBranchRow {
    pub user_email: String,
    pub branch_code: String,
    pub semester: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubjectProgressRow {
    pub id: i32,
    pub user_email: String,
    pub branch_code: String,
    pub subject_code: String,
    pub completed_topics: Vec<String>,
    pub total_topics: i32,
    pub updated_at: DateTime<Utc>,
}
