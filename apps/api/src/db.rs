use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Table shapes. Every statement is idempotent so this runs on each start.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        email       TEXT PRIMARY KEY,
        name        TEXT,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token       TEXT PRIMARY KEY,
        user_email  TEXT NOT NULL,
        user_name   TEXT,
        expires_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS engineering_branches (
        id          SERIAL PRIMARY KEY,
        code        TEXT NOT NULL UNIQUE,
        name        TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        subjects    TEXT[] NOT NULL DEFAULT '{}',
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS branch_subjects (
        id            SERIAL PRIMARY KEY,
        branch_code   TEXT NOT NULL,
        subject_code  TEXT NOT NULL,
        subject_name  TEXT NOT NULL,
        semester      INT NOT NULL,
        credits       INT NOT NULL,
        is_core       BOOLEAN NOT NULL DEFAULT TRUE,
        prerequisites JSONB NOT NULL DEFAULT '[]',
        syllabus      JSONB NOT NULL DEFAULT '{}',
        UNIQUE (branch_code, subject_code)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS question_papers (
        id                  SERIAL PRIMARY KEY,
        paper_id            TEXT NOT NULL UNIQUE,
        branch_code         TEXT NOT NULL,
        subject_code        TEXT NOT NULL,
        university          TEXT NOT NULL,
        exam_year           INT NOT NULL,
        exam_type           TEXT NOT NULL,
        pdf_url             TEXT,
        extracted_questions JSONB NOT NULL DEFAULT '[]',
        difficulty          TEXT NOT NULL DEFAULT 'medium',
        total_marks         INT NOT NULL,
        duration_minutes    INT NOT NULL,
        uploaded_by         TEXT NOT NULL,
        download_count      INT NOT NULL DEFAULT 0,
        created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mock_exams (
        id               SERIAL PRIMARY KEY,
        exam_id          TEXT NOT NULL UNIQUE,
        title            TEXT NOT NULL,
        branch_code      TEXT NOT NULL,
        subject_code     TEXT NOT NULL,
        source_years     INT[] NOT NULL DEFAULT '{}',
        questions        JSONB NOT NULL DEFAULT '[]',
        total_questions  INT NOT NULL,
        total_marks      INT NOT NULL,
        duration_minutes INT NOT NULL,
        created_by       TEXT NOT NULL,
        is_public        BOOLEAN NOT NULL DEFAULT TRUE,
        created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id               SERIAL PRIMARY KEY,
        cid              TEXT NOT NULL UNIQUE,
        name             TEXT NOT NULL,
        description      TEXT NOT NULL DEFAULT '',
        category         TEXT NOT NULL DEFAULT 'general',
        level            TEXT NOT NULL DEFAULT 'beginner',
        include_video    BOOLEAN NOT NULL DEFAULT FALSE,
        no_of_chapters   INT NOT NULL,
        course_layout    JSONB NOT NULL,
        course_content   JSONB NOT NULL DEFAULT '[]',
        banner_image_url TEXT,
        user_email       TEXT NOT NULL,
        created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        id                 SERIAL PRIMARY KEY,
        cid                TEXT NOT NULL REFERENCES courses (cid),
        user_email         TEXT NOT NULL,
        completed_chapters JSONB NOT NULL DEFAULT '[]',
        created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (cid, user_email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_branches (
        user_email  TEXT PRIMARY KEY,
        branch_code TEXT NOT NULL,
        semester    INT NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subject_progress (
        id               SERIAL PRIMARY KEY,
        user_email       TEXT NOT NULL,
        branch_code      TEXT NOT NULL,
        subject_code     TEXT NOT NULL,
        completed_topics TEXT[] NOT NULL DEFAULT '{}',
        total_topics     INT NOT NULL,
        updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (user_email, branch_code, subject_code)
    )
    "#,
];

/// Creates any missing tables.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to apply schema statement: {}", statement.trim()))?;
    }
    info!("Database schema ready ({} tables)", SCHEMA.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_idempotent() {
        for statement in SCHEMA {
            assert!(
                statement.contains("CREATE TABLE IF NOT EXISTS"),
                "non-idempotent statement: {statement}"
            );
        }
    }

    #[test]
    fn natural_keys_are_unique_constraints() {
        let joined = SCHEMA.join("\n");
        for key in [
            "code        TEXT NOT NULL UNIQUE",
            "UNIQUE (branch_code, subject_code)",
            "paper_id            TEXT NOT NULL UNIQUE",
            "exam_id          TEXT NOT NULL UNIQUE",
            "UNIQUE (cid, user_email)",
        ] {
            assert!(joined.contains(key), "missing unique key: {key}");
        }
    }
}
