//! Course storage and enrollment progress.

pub mod handlers;

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::course_layout::CourseLayout;
use crate::models::course::{CourseRow, EnrollmentRow};

/// Keeps the distinct in-range chapter indices, ascending.
pub fn normalize_completed(indices: &[i64], chapter_count: usize) -> Vec<usize> {
    let mut kept: Vec<usize> = indices
        .iter()
        .filter_map(|&i| usize::try_from(i).ok())
        .filter(|&i| i < chapter_count)
        .collect();
    kept.sort_unstable();
    kept.dedup();
    kept
}

/// Reads a stored `completed_chapters` blob, ignoring anything that is not an index.
pub fn completed_from_value(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

/// Whole-number percentage of chapters completed; 0 for a course without chapters.
pub fn progress_percent(completed: &[i64], chapter_count: usize) -> u32 {
    if chapter_count == 0 {
        return 0;
    }
    let done = normalize_completed(completed, chapter_count).len();
    ((done as f64 * 100.0) / chapter_count as f64).round() as u32
}

/// Every course with generated chapter content, newest first.
pub async fn list_published(pool: &PgPool) -> Result<Vec<CourseRow>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT * FROM courses
        WHERE jsonb_typeof(course_content) = 'array'
          AND jsonb_array_length(course_content) > 0
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub fn share_link(base_url: &str, cid: &str) -> String {
    format!("{}/course/{}", base_url.trim_end_matches('/'), cid)
}

// ────────────────────────────────────────────────────────────────────────────
// Queries
// ────────────────────────────────────────────────────────────────────────────

pub async fn insert_course(
    pool: &PgPool,
    layout: &CourseLayout,
    user_email: &str,
) -> Result<CourseRow, AppError> {
    let cid = Uuid::new_v4().to_string();
    let layout_json = serde_json::to_value(layout)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode course layout: {e}")))?;

    let row = sqlx::query_as::<_, CourseRow>(
        r#"
        INSERT INTO courses
            (cid, name, description, category, level, include_video,
             no_of_chapters, course_layout, user_email)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&cid)
    .bind(&layout.course_name)
    .bind(&layout.description)
    .bind(&layout.category)
    .bind(&layout.level)
    .bind(layout.include_video)
    .bind(i32::try_from(layout.chapters.len()).unwrap_or(i32::MAX))
    .bind(layout_json)
    .bind(user_email)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn find_course(pool: &PgPool, cid: &str) -> Result<CourseRow, AppError> {
    sqlx::query_as::<_, CourseRow>("SELECT * FROM courses WHERE cid = $1")
        .bind(cid)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {cid} not found")))
}

pub async fn find_enrollment(
    pool: &PgPool,
    cid: &str,
    user_email: &str,
) -> Result<Option<EnrollmentRow>, AppError> {
    let row = sqlx::query_as::<_, EnrollmentRow>(
        "SELECT * FROM enrollments WHERE cid = $1 AND user_email = $2",
    )
    .bind(cid)
    .bind(user_email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
