//! Idempotent loading of portal reference data.
//!
//! Every record is written with `INSERT ... ON CONFLICT (natural key) DO UPDATE`,
//! so re-running converges on the literal data instead of duplicating it.
//! A failing record is logged and counted; the rest of the batch continues.

pub mod data;
pub mod handlers;

use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::db::ensure_schema;
use crate::models::portal::MockQuestion;
use data::{
    subject_names, BranchSeed, MockExamSeed, PaperSeed, SubjectSeed, BRANCHES, MOCK_EXAMS,
    PAPERS, SEED_AUTHOR, SUBJECTS,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeedReport {
    pub table: &'static str,
    pub upserted: usize,
    pub failed: usize,
}

impl SeedReport {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            upserted: 0,
            failed: 0,
        }
    }

    fn record(&mut self, key: &str, outcome: Result<(), sqlx::Error>) {
        match outcome {
            Ok(()) => self.upserted += 1,
            Err(e) => {
                warn!(table = self.table, key, error = %e, "Seed record failed");
                self.failed += 1;
            }
        }
    }
}

/// Creates missing tables and upserts all reference data.
pub async fn run_seed(pool: &PgPool) -> Result<Vec<SeedReport>> {
    ensure_schema(pool).await?;

    let mut branches = SeedReport::new("engineering_branches");
    for branch in BRANCHES {
        branches.record(branch.code, upsert_branch(pool, branch).await);
    }

    let mut subjects = SeedReport::new("branch_subjects");
    for subject in SUBJECTS {
        subjects.record(subject.subject_code, upsert_subject(pool, subject).await);
    }

    let mut papers = SeedReport::new("question_papers");
    for paper in PAPERS {
        papers.record(paper.paper_id, upsert_paper(pool, paper).await);
    }

    let mut exams = SeedReport::new("mock_exams");
    for exam in MOCK_EXAMS {
        exams.record(exam.exam_id, upsert_mock_exam(pool, exam).await);
    }

    let reports = vec![branches, subjects, papers, exams];
    for report in &reports {
        info!(
            table = report.table,
            upserted = report.upserted,
            failed = report.failed,
            "Seeded table"
        );
    }
    Ok(reports)
}

async fn upsert_branch(pool: &PgPool, branch: &BranchSeed) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO engineering_branches (code, name, description, subjects)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (code) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                subjects = EXCLUDED.subjects
        "#,
    )
    .bind(branch.code)
    .bind(branch.name)
    .bind(branch.description)
    .bind(subject_names(branch.code))
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_subject(pool: &PgPool, subject: &SubjectSeed) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO branch_subjects
            (branch_code, subject_code, subject_name, semester, credits, is_core, prerequisites, syllabus)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (branch_code, subject_code) DO UPDATE
            SET subject_name = EXCLUDED.subject_name,
                semester = EXCLUDED.semester,
                credits = EXCLUDED.credits,
                is_core = EXCLUDED.is_core,
                prerequisites = EXCLUDED.prerequisites,
                syllabus = EXCLUDED.syllabus
        "#,
    )
    .bind(subject.branch_code)
    .bind(subject.subject_code)
    .bind(subject.subject_name)
    .bind(subject.semester)
    .bind(subject.credits)
    .bind(subject.is_core)
    .bind(json!(subject.prerequisites))
    .bind(json!({ "units": subject.units }))
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_paper(pool: &PgPool, paper: &PaperSeed) -> Result<(), sqlx::Error> {
    let questions: Vec<_> = paper
        .questions
        .iter()
        .map(|(question, marks)| json!({ "question": question, "marks": marks }))
        .collect();

    // download_count is left alone on conflict.
    sqlx::query(
        r#"
        INSERT INTO question_papers
            (paper_id, branch_code, subject_code, university, exam_year, exam_type, pdf_url,
             extracted_questions, difficulty, total_marks, duration_minutes, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (paper_id) DO UPDATE
            SET branch_code = EXCLUDED.branch_code,
                subject_code = EXCLUDED.subject_code,
                university = EXCLUDED.university,
                exam_year = EXCLUDED.exam_year,
                exam_type = EXCLUDED.exam_type,
                pdf_url = EXCLUDED.pdf_url,
                extracted_questions = EXCLUDED.extracted_questions,
                difficulty = EXCLUDED.difficulty,
                total_marks = EXCLUDED.total_marks,
                duration_minutes = EXCLUDED.duration_minutes
        "#,
    )
    .bind(paper.paper_id)
    .bind(paper.branch_code)
    .bind(paper.subject_code)
    .bind(paper.university)
    .bind(paper.exam_year)
    .bind(paper.exam_type)
    .bind(paper.pdf_url)
    .bind(json!(questions))
    .bind(paper.difficulty)
    .bind(paper.total_marks)
    .bind(paper.duration_minutes)
    .bind(SEED_AUTHOR)
    .execute(pool)
    .await?;
    Ok(())
}

/// Converts seed literals into stored mock questions.
pub fn mock_questions(exam: &MockExamSeed) -> Vec<MockQuestion> {
    exam.questions
        .iter()
        .map(|q| MockQuestion {
            question: q.question.to_string(),
            options: q.options.iter().map(|o| o.to_string()).collect(),
            correct_answer: q.correct_answer,
            marks: q.marks,
        })
        .collect()
}

async fn upsert_mock_exam(pool: &PgPool, exam: &MockExamSeed) -> Result<(), sqlx::Error> {
    let questions = mock_questions(exam);
    let total_marks: u32 = questions.iter().map(|q| q.marks).sum();

    sqlx::query(
        r#"
        INSERT INTO mock_exams
            (exam_id, title, branch_code, subject_code, source_years, questions,
             total_questions, total_marks, duration_minutes, created_by, is_public)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
        ON CONFLICT (exam_id) DO UPDATE
            SET title = EXCLUDED.title,
                branch_code = EXCLUDED.branch_code,
                subject_code = EXCLUDED.subject_code,
                source_years = EXCLUDED.source_years,
                questions = EXCLUDED.questions,
                total_questions = EXCLUDED.total_questions,
                total_marks = EXCLUDED.total_marks,
                duration_minutes = EXCLUDED.duration_minutes
        "#,
    )
    .bind(exam.exam_id)
    .bind(exam.title)
    .bind(exam.branch_code)
    .bind(exam.subject_code)
    .bind(exam.source_years.to_vec())
    .bind(json!(questions))
    .bind(i32::try_from(questions.len()).unwrap_or(i32::MAX))
    .bind(i32::try_from(total_marks).unwrap_or(i32::MAX))
    .bind(exam.duration_minutes)
    .bind(SEED_AUTHOR)
    .execute(pool)
    .await?;
    Ok(())
}
