use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseRow {
    pub id: i32,
    pub cid: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub include_video: bool,
    pub no_of_chapters: i32,
    /// Serialized `CourseLayout`.
    pub course_layout: Value,
    /// Array of generated chapter content.
    pub course_content: Value,
    pub banner_image_url: Option<String>,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl CourseRow {
    /// Number of chapters in the stored layout, falling back to the requested count.
    pub fn chapter_count(&self) -> usize {
        self.course_layout
            .get("chapters")
            .and_then(|c| c.as_array())
            .map(|c| c.len())
            .unwrap_or_else(|| usize::try_from(self.no_of_chapters).unwrap_or(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrollmentRow {
    pub id: i32,
    pub cid: String,
    pub user_email: String,
    /// JSON array of zero-based chapter indices.
    pub completed_chapters: Value,
    pub created_at: DateTime<Utc>,
}
