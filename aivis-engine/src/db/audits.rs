//! Page audit database operations
//!
//! Audit rows are written by the external crawling subsystem; this service
//! only reads the most recent snapshot per project to feed the
//! recommendation generator.

use aivis_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Record a crawl snapshot (used by tests and external writers)
pub async fn insert_audit(
    pool: &SqlitePool,
    project_id: Uuid,
    issue_codes: &[String],
    crawled_at: DateTime<Utc>,
) -> Result<()> {
    let codes = serde_json::to_string(issue_codes)
        .map_err(|e| Error::Internal(format!("Failed to encode issue codes: {}", e)))?;

    sqlx::query(
        "INSERT INTO page_audits (guid, project_id, issue_codes, crawled_at) VALUES (?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(project_id.to_string())
    .bind(codes)
    .bind(crawled_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Issue codes from the project's most recent crawl, or empty if the
/// project has never been crawled
pub async fn latest_issue_codes(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<String>> {
    let row = sqlx::query(
        "SELECT issue_codes FROM page_audits WHERE project_id = ?
         ORDER BY crawled_at DESC LIMIT 1",
    )
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(Vec::new()),
    };

    let codes_json: String = row.get("issue_codes");
    serde_json::from_str(&codes_json)
        .map_err(|e| Error::Internal(format!("Failed to decode issue codes: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Plan, Project};
    use chrono::Duration;

    #[tokio::test]
    async fn test_latest_issue_codes_picks_newest_snapshot() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.expect("Schema init failed");

        let account = Account {
            guid: Uuid::new_v4(),
            email: "owner@acme.com".to_string(),
            plan: Plan::Free,
            created_at: Utc::now(),
        };
        crate::db::accounts::insert_account(&pool, &account).await.unwrap();
        let project = Project {
            guid: Uuid::new_v4(),
            account_id: account.guid,
            name: "Acme".to_string(),
            domain: "acme.com".to_string(),
            created_at: Utc::now(),
        };
        crate::db::projects::insert_project(&pool, &project).await.unwrap();

        let now = Utc::now();
        insert_audit(&pool, project.guid, &["missing-schema-markup".to_string()], now - Duration::days(7))
            .await
            .unwrap();
        insert_audit(
            &pool,
            project.guid,
            &["thin-content".to_string(), "slow-page".to_string()],
            now,
        )
        .await
        .unwrap();

        let codes = latest_issue_codes(&pool, project.guid).await.unwrap();
        assert_eq!(codes, vec!["thin-content", "slow-page"]);
    }

    #[tokio::test]
    async fn test_latest_issue_codes_empty_without_crawl() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.expect("Schema init failed");

        let codes = latest_issue_codes(&pool, Uuid::new_v4()).await.unwrap();
        assert!(codes.is_empty());
    }
}
