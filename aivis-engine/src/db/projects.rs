//! Project and competitor database operations

use crate::models::{Competitor, Project};
use aivis_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Save a new project
pub async fn insert_project(pool: &SqlitePool, project: &Project) -> Result<()> {
    sqlx::query(
        "INSERT INTO projects (guid, account_id, name, domain, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(project.guid.to_string())
    .bind(project.account_id.to_string())
    .bind(&project.name)
    .bind(&project.domain)
    .bind(project.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a project by id, if it exists
pub async fn get_project(pool: &SqlitePool, project_id: Uuid) -> Result<Option<Project>> {
    let row = sqlx::query(
        "SELECT guid, account_id, name, domain, created_at FROM projects WHERE guid = ?",
    )
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    Ok(Some(Project {
        guid: parse_uuid(row.get("guid"))?,
        account_id: parse_uuid(row.get("account_id"))?,
        name: row.get("name"),
        domain: row.get("domain"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }))
}

/// Save a tracked competitor domain
pub async fn insert_competitor(pool: &SqlitePool, competitor: &Competitor) -> Result<()> {
    sqlx::query(
        "INSERT INTO competitors (guid, project_id, domain, name, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(competitor.guid.to_string())
    .bind(competitor.project_id.to_string())
    .bind(&competitor.domain)
    .bind(&competitor.name)
    .bind(competitor.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// List a project's tracked competitor domains in insertion order
pub async fn list_competitor_domains(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT domain FROM competitors WHERE project_id = ? ORDER BY created_at, guid",
    )
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("domain")).collect())
}

fn parse_uuid(s: String) -> Result<Uuid> {
    Uuid::parse_str(&s).map_err(|e| Error::Internal(format!("Malformed guid in database: {}", e)))
}
