//! Database access for the visibility engine
//!
//! SQLite schema and plain query functions. All timestamps are stored as
//! RFC 3339 TEXT in UTC; uuids and enums are stored in their stable string
//! forms.

pub mod accounts;
pub mod audits;
pub mod checks;
pub mod projects;

use aivis_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to aivis.db in the data folder, creating the file and schema
/// if missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create engine tables if they don't exist
///
/// `visibility_checks` is an append-only observation log: rows are created
/// by the check orchestrator and never updated or deleted by this service.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            guid TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            plan TEXT NOT NULL DEFAULT 'free',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            guid TEXT PRIMARY KEY,
            account_id TEXT NOT NULL REFERENCES accounts(guid),
            name TEXT NOT NULL,
            domain TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS competitors (
            guid TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(guid),
            domain TEXT NOT NULL,
            name TEXT,
            created_at TEXT NOT NULL,
            UNIQUE(project_id, domain)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS visibility_checks (
            guid TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(guid),
            provider TEXT NOT NULL,
            query TEXT NOT NULL,
            keyword_id TEXT,
            response_text TEXT,
            brand_mentioned INTEGER NOT NULL DEFAULT 0,
            url_cited INTEGER NOT NULL DEFAULT 0,
            cited_url TEXT,
            citation_position INTEGER,
            competitor_mentions TEXT NOT NULL DEFAULT '[]',
            sentiment TEXT,
            brand_description TEXT,
            region TEXT NOT NULL DEFAULT 'us',
            language TEXT NOT NULL DEFAULT 'en',
            checked_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_checks_project_time
         ON visibility_checks(project_id, checked_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS page_audits (
            guid TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(guid),
            issue_codes TEXT NOT NULL DEFAULT '[]',
            crawled_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_tables_is_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        init_tables(&pool).await.expect("First init failed");
        init_tables(&pool).await.expect("Second init failed");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visibility_checks")
            .fetch_one(&pool)
            .await
            .expect("Failed to count checks");
        assert_eq!(count, 0);
    }
}
