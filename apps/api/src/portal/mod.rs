//! Engineering branch portal: reference data, mock exams, and study progress.

pub mod handlers;

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::portal::{MockQuestion, SubjectProgressRow};

pub const MIN_SEMESTER: i32 = 1;
pub const MAX_SEMESTER: i32 = 8;

pub fn validate_semester(semester: i32) -> Result<i32, AppError> {
    if (MIN_SEMESTER..=MAX_SEMESTER).contains(&semester) {
        Ok(semester)
    } else {
        Err(AppError::Validation(format!(
            "semester must be between {MIN_SEMESTER} and {MAX_SEMESTER}"
        )))
    }
}

/// Branch codes are stored upper-case (`CSE`, `ECE`, ...).
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// ────────────────────────────────────────────────────────────────────────────
// Mock exams
// ────────────────────────────────────────────────────────────────────────────

/// A mock exam question as shown to a candidate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicQuestion {
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
    pub marks: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExamScore {
    pub score: u32,
    pub total_marks: u32,
    pub correct: usize,
    pub attempted: usize,
    /// Score over total marks, one decimal place.
    pub percentage: f64,
}

pub fn parse_questions(questions: &Value) -> Result<Vec<MockQuestion>, AppError> {
    serde_json::from_value(questions.clone())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Malformed mock exam questions: {e}")))
}

pub fn strip_answers(questions: &[MockQuestion]) -> Vec<PublicQuestion> {
    questions
        .iter()
        .enumerate()
        .map(|(index, q)| PublicQuestion {
            index,
            question: q.question.clone(),
            options: q.options.clone(),
            marks: q.marks,
        })
        .collect()
}

/// Scores answers positionally. `None` and out-of-range choices count as unattempted;
/// answers beyond the last question are ignored.
pub fn score_submission(questions: &[MockQuestion], answers: &[Option<usize>]) -> ExamScore {
    let total_marks: u32 = questions.iter().map(|q| q.marks).sum();
    let mut score = 0;
    let mut correct = 0;
    let mut attempted = 0;

    for (question, answer) in questions.iter().zip(answers) {
        let Some(choice) = answer.filter(|&c| c < question.options.len()) else {
            continue;
        };
        attempted += 1;
        if choice == question.correct_answer {
            correct += 1;
            score += question.marks;
        }
    }

    let percentage = if total_marks == 0 {
        0.0
    } else {
        (f64::from(score) * 1000.0 / f64::from(total_marks)).round() / 10.0
    };

    ExamScore {
        score,
        total_marks,
        correct,
        attempted,
        percentage,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Study progress
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SubjectProgress {
    pub subject_code: String,
    pub completed_topics: Vec<String>,
    pub total_topics: i32,
    pub percent: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchProgress {
    pub branch_code: String,
    pub subjects: Vec<SubjectProgress>,
    pub overall_percent: u32,
}

/// Adds `topic` unless already present (case-insensitive). Returns whether it was added.
/// Adds one topic to a subject's completed set inside the upsert itself, so
/// concurrent recordings for the same subject never overwrite each other.
/// Topics compare case-insensitively.
const RECORD_TOPIC_SQL: &str = r#"
    INSERT INTO subject_progress (user_email, branch_code, subject_code, completed_topics, total_topics)
    VALUES ($1, $2, $3, ARRAY[$4::TEXT], $5)
    ON CONFLICT (user_email, branch_code, subject_code) DO UPDATE
        SET completed_topics = CASE
                WHEN EXISTS (
                    SELECT 1 FROM unnest(subject_progress.completed_topics) AS done(topic)
                    WHERE lower(done.topic) = lower($4)
                )
                THEN subject_progress.completed_topics
                ELSE array_append(subject_progress.completed_topics, $4::TEXT)
            END,
            total_topics = EXCLUDED.total_topics,
            updated_at = NOW()
    RETURNING *
"#;

pub async fn record_topic(
    db: &PgPool,
    user_email: &str,
    branch_code: &str,
    subject_code: &str,
    topic: &str,
    total_topics: i32,
) -> Result<SubjectProgressRow, sqlx::Error> {
    sqlx::query_as(RECORD_TOPIC_SQL)
        .bind(user_email)
        .bind(branch_code)
        .bind(subject_code)
        .bind(topic.trim())
        .bind(total_topics)
        .fetch_one(db)
        .await
}

pub fn topic_percent(completed: usize, total_topics: i32) -> u32 {
    if total_topics <= 0 {
        return 0;
    }
    let pct = (completed as f64 * 100.0 / f64::from(total_topics)).round() as u32;
    pct.min(100)
}

pub fn branch_progress(branch_code: String, rows: Vec<SubjectProgressRow>) -> BranchProgress {
    let subjects: Vec<SubjectProgress> = rows
        .into_iter()
        .map(|row| SubjectProgress {
            percent: topic_percent(row.completed_topics.len(), row.total_topics),
            subject_code: row.subject_code,
            completed_topics: row.completed_topics,
            total_topics: row.total_topics,
        })
        .collect();

    let overall_percent = if subjects.is_empty() {
        0
    } else {
        let sum: u32 = subjects.iter().map(|s| s.percent).sum();
        (f64::from(sum) / subjects.len() as f64).round() as u32
    };

    BranchProgress {
        branch_code,
        subjects,
        overall_percent,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn question(correct: usize, marks: u32) -> MockQuestion {
        MockQuestion {
            question: "Pick one".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: correct,
            marks,
        }
    }

    fn progress_row(subject: &str, done: &[&str], total: i32) -> SubjectProgressRow {
        SubjectProgressRow {
            id: 1,
            user_email: "s@campus.test".into(),
            branch_code: "CSE".into(),
            subject_code: subject.into(),
            completed_topics: done.iter().map(|s| s.to_string()).collect(),
            total_topics: total,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn semester_bounds() {
        assert!(validate_semester(1).is_ok());
        assert!(validate_semester(8).is_ok());
        assert!(matches!(validate_semester(0), Err(AppError::Validation(_))));
        assert!(matches!(validate_semester(9), Err(AppError::Validation(_))));
    }

    #[test]
    fn answers_are_hidden_from_candidates() {
        let public = strip_answers(&[question(2, 4)]);
        let rendered = serde_json::to_value(&public).unwrap();
        assert_eq!(rendered[0]["index"], 0);
        assert!(rendered[0].get("correct_answer").is_none());
    }

    #[test]
    fn scoring_counts_marks_attempts_and_percentage() {
        let questions = [question(0, 2), question(1, 3), question(2, 5), question(3, 2)];
        let score = score_submission(&questions, &[Some(0), Some(2), None, Some(3), Some(1)]);
        assert_eq!(
            score,
            ExamScore {
                score: 4,
                total_marks: 12,
                correct: 2,
                attempted: 3,
                percentage: 33.3,
            }
        );
    }

    #[test]
    fn out_of_range_choice_is_unattempted() {
        let score = score_submission(&[question(0, 1)], &[Some(7)]);
        assert_eq!(score.attempted, 0);
        assert_eq!(score.score, 0);
        assert_eq!(score_submission(&[], &[]).percentage, 0.0);
    }

    #[test]
    fn stored_questions_parse() {
        let parsed = parse_questions(&json!([
            {"question": "2+2?", "options": ["3", "4"], "correct_answer": 1, "marks": 1}
        ]))
        .unwrap();
        assert_eq!(parsed[0].correct_answer, 1);
        assert!(parse_questions(&json!({"nope": true})).is_err());
    }

    /// Runs against a real database when `TEST_DATABASE_URL` is set.
    #[tokio::test]
    async fn concurrent_topic_recordings_are_all_kept() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return;
        };
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::ensure_schema(&pool).await.unwrap();
        let email = format!("progress-{}@campus.test", uuid::Uuid::new_v4());

        let topics = ["Stacks", "Queues", "Heaps", "Tries", "Graphs", "Hashing"];
        let mut writes = tokio::task::JoinSet::new();
        for topic in topics {
            let (pool, email) = (pool.clone(), email.clone());
            writes.spawn(async move { record_topic(&pool, &email, "CSE", "CS201", topic, 10).await });
        }
        while let Some(result) = writes.join_next().await {
            result.unwrap().unwrap();
        }

        let row = record_topic(&pool, &email, "CSE", "CS201", " stacks ", 12)
            .await
            .unwrap();
        let mut stored = row.completed_topics.clone();
        stored.sort();
        let mut expected: Vec<String> = topics.iter().map(|t| t.to_string()).collect();
        expected.sort();
        assert_eq!(stored, expected);
        assert_eq!(row.total_topics, 12);
    }

    #[test]
    fn overall_progress_is_mean_of_subjects() {
        let progress = branch_progress(
            "CSE".into(),
            vec![
                progress_row("CS201", &["a", "b"], 4),
                progress_row("CS202", &["a"], 3),
                progress_row("CS203", &[], 0),
            ],
        );
        let percents: Vec<u32> = progress.subjects.iter().map(|s| s.percent).collect();
        assert_eq!(percents, vec![50, 33, 0]);
        assert_eq!(progress.overall_percent, 28);

        assert_eq!(branch_progress("ECE".into(), vec![]).overall_percent, 0);
    }

    #[test]
    fn topic_percent_caps_at_full() {
        assert_eq!(topic_percent(5, 4), 100);
        assert_eq!(topic_percent(1, -2), 0);
    }
}
