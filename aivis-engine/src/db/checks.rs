//! Visibility check database operations
//!
//! The checks table is an append-only observation log. Insert and read
//! only; no update or delete paths exist in this service.

use crate::models::VisibilityCheck;
use crate::types::{CompetitorMention, Provider, SentimentLabel};
use aivis_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Save one check observation
pub async fn insert_check(pool: &SqlitePool, check: &VisibilityCheck) -> Result<()> {
    let competitor_mentions = serde_json::to_string(&check.competitor_mentions)
        .map_err(|e| Error::Internal(format!("Failed to encode competitor mentions: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO visibility_checks (
            guid, project_id, provider, query, keyword_id, response_text,
            brand_mentioned, url_cited, cited_url, citation_position,
            competitor_mentions, sentiment, brand_description,
            region, language, checked_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(check.guid.to_string())
    .bind(check.project_id.to_string())
    .bind(check.provider.as_str())
    .bind(&check.query)
    .bind(&check.keyword_id)
    .bind(&check.response_text)
    .bind(check.brand_mentioned)
    .bind(check.url_cited)
    .bind(&check.cited_url)
    .bind(check.citation_position)
    .bind(competitor_mentions)
    .bind(check.sentiment.map(|s| s.as_str()))
    .bind(&check.brand_description)
    .bind(&check.region)
    .bind(&check.language)
    .bind(check.checked_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// List a project's checks, newest first, optionally bounded below by
/// `since` and capped at `limit` rows
pub async fn list_for_project(
    pool: &SqlitePool,
    project_id: Uuid,
    since: Option<DateTime<Utc>>,
    limit: Option<i64>,
) -> Result<Vec<VisibilityCheck>> {
    let mut sql = String::from(
        "SELECT guid, project_id, provider, query, keyword_id, response_text,
                brand_mentioned, url_cited, cited_url, citation_position,
                competitor_mentions, sentiment, brand_description,
                region, language, checked_at
         FROM visibility_checks WHERE project_id = ?",
    );
    if since.is_some() {
        sql.push_str(" AND checked_at >= ?");
    }
    sql.push_str(" ORDER BY checked_at DESC");
    if limit.is_some() {
        sql.push_str(" LIMIT ?");
    }

    let mut query = sqlx::query(&sql).bind(project_id.to_string());
    if let Some(since) = since {
        query = query.bind(since);
    }
    if let Some(limit) = limit {
        query = query.bind(limit);
    }

    let rows = query.fetch_all(pool).await?;
    rows.into_iter().map(row_to_check).collect()
}

/// Count checks consumed by an account across all of its projects since
/// `period_start`
///
/// This is the derived monthly quota usage; it is never cached or stored
/// as a counter.
pub async fn count_for_account_since(
    pool: &SqlitePool,
    account_id: Uuid,
    period_start: DateTime<Utc>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)
         FROM visibility_checks vc
         JOIN projects p ON vc.project_id = p.guid
         WHERE p.account_id = ? AND vc.checked_at >= ?",
    )
    .bind(account_id.to_string())
    .bind(period_start)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

fn row_to_check(row: SqliteRow) -> Result<VisibilityCheck> {
    let guid_str: String = row.get("guid");
    let project_id_str: String = row.get("project_id");
    let provider_str: String = row.get("provider");
    let provider = Provider::parse(&provider_str).ok_or_else(|| {
        Error::Internal(format!("Unknown provider in database: {}", provider_str))
    })?;

    let mentions_json: String = row.get("competitor_mentions");
    let competitor_mentions: Vec<CompetitorMention> = serde_json::from_str(&mentions_json)
        .map_err(|e| Error::Internal(format!("Failed to decode competitor mentions: {}", e)))?;

    let sentiment = row
        .get::<Option<String>, _>("sentiment")
        .as_deref()
        .and_then(SentimentLabel::parse);

    Ok(VisibilityCheck {
        guid: Uuid::parse_str(&guid_str)
            .map_err(|e| Error::Internal(format!("Malformed check guid: {}", e)))?,
        project_id: Uuid::parse_str(&project_id_str)
            .map_err(|e| Error::Internal(format!("Malformed project guid: {}", e)))?,
        provider,
        query: row.get("query"),
        keyword_id: row.get("keyword_id"),
        response_text: row.get("response_text"),
        brand_mentioned: row.get("brand_mentioned"),
        url_cited: row.get("url_cited"),
        cited_url: row.get("cited_url"),
        citation_position: row.get::<Option<i64>, _>("citation_position").map(|p| p as u32),
        competitor_mentions,
        sentiment,
        brand_description: row.get("brand_description"),
        region: row.get("region"),
        language: row.get("language"),
        checked_at: row.get::<DateTime<Utc>, _>("checked_at"),
    })
}
