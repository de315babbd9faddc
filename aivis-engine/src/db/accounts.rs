//! Account database operations

use crate::models::{Account, Plan};
use aivis_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Save a new account
pub async fn insert_account(pool: &SqlitePool, account: &Account) -> Result<()> {
    sqlx::query(
        "INSERT INTO accounts (guid, email, plan, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(account.guid.to_string())
    .bind(&account.email)
    .bind(account.plan.as_str())
    .bind(account.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load an account by id, if it exists
pub async fn get_account(pool: &SqlitePool, account_id: Uuid) -> Result<Option<Account>> {
    let row = sqlx::query(
        "SELECT guid, email, plan, created_at FROM accounts WHERE guid = ?",
    )
    .bind(account_id.to_string())
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let guid_str: String = row.get("guid");
    let plan_str: String = row.get("plan");
    let plan = Plan::parse(&plan_str)
        .ok_or_else(|| Error::Internal(format!("Unknown plan tier in database: {}", plan_str)))?;

    Ok(Some(Account {
        guid: Uuid::parse_str(&guid_str)
            .map_err(|e| Error::Internal(format!("Malformed account guid: {}", e)))?,
        email: row.get("email"),
        plan,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get_account() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init_tables(&pool).await.expect("Schema init failed");

        let account = Account {
            guid: Uuid::new_v4(),
            email: "owner@acme.com".to_string(),
            plan: Plan::Pro,
            created_at: Utc::now(),
        };
        insert_account(&pool, &account).await.expect("Insert failed");

        let loaded = get_account(&pool, account.guid)
            .await
            .expect("Load failed")
            .expect("Account missing");
        assert_eq!(loaded.email, "owner@acme.com");
        assert_eq!(loaded.plan, Plan::Pro);
    }

    #[tokio::test]
    async fn test_get_account_unknown_id() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init_tables(&pool).await.expect("Schema init failed");

        let loaded = get_account(&pool, Uuid::new_v4()).await.expect("Load failed");
        assert!(loaded.is_none());
    }
}
