//! Visibility check orchestration
//!
//! Runs one query through the full pipeline: validation, ownership and
//! quota admission (both fail fast, before any external call), concurrent
//! provider fan-out, best-effort sentiment enrichment, and independent
//! parallel persistence.
//!
//! The caller-visible contract is a best-effort batch: a provider that
//! fails is omitted, a row that fails to write is reported next to the
//! rows that stored, and the batch may legitimately hold fewer rows than
//! providers were requested.

use crate::models::VisibilityCheck;
use crate::providers::ProviderPool;
use crate::services::quota_guard::{self, QuotaError};
use crate::services::sentiment_enricher;
use crate::types::{Provider, QueryContext, SentimentAnalyzer};
use aivis_common::time;
use futures::future::join_all;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// One check batch request
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub query: String,
    pub providers: Vec<Provider>,
    /// Overrides the project's tracked competitor list when present
    pub competitors: Option<Vec<String>>,
    pub keyword_id: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
}

/// A row that failed to persist
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub provider: Provider,
    pub message: String,
}

/// Outcome of one check batch: stored rows plus any write failures
#[derive(Debug)]
pub struct CheckBatchOutcome {
    pub stored: Vec<VisibilityCheck>,
    pub failed_writes: Vec<WriteFailure>,
}

/// Orchestration errors (the fail-fast portion of the pipeline)
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Storage(#[from] aivis_common::Error),
}

/// Run one visibility check batch
pub async fn run_check(
    pool: &SqlitePool,
    engines: &ProviderPool,
    sentiment: Option<&Arc<dyn SentimentAnalyzer>>,
    account_id: Uuid,
    project_id: Uuid,
    request: CheckRequest,
) -> Result<CheckBatchOutcome, CheckError> {
    if request.query.trim().is_empty() {
        return Err(CheckError::Validation("Query must not be empty".to_string()));
    }
    if request.providers.is_empty() {
        return Err(CheckError::Validation(
            "At least one provider must be requested".to_string(),
        ));
    }

    // Requested provider set, deduplicated; quota is charged per provider
    let mut providers: Vec<Provider> = Vec::new();
    for provider in &request.providers {
        if !providers.contains(provider) {
            providers.push(*provider);
        }
    }

    // Ownership checks fail fast, before quota and before any external call
    let account = crate::db::accounts::get_account(pool, account_id)
        .await?
        .ok_or_else(|| CheckError::NotFound(format!("Account {}", account_id)))?;

    let project = crate::db::projects::get_project(pool, project_id)
        .await?
        .filter(|p| p.account_id == account_id)
        .ok_or_else(|| CheckError::NotFound(format!("Project {}", project_id)))?;

    let competitor_domains = match request.competitors {
        Some(override_list) => override_list,
        None => crate::db::projects::list_competitor_domains(pool, project_id).await?,
    };

    quota_guard::admit(pool, &account, providers.len(), time::now()).await?;

    let ctx = QueryContext {
        query: request.query.clone(),
        target_domain: project.domain.clone(),
        competitor_domains,
        region: request.region.unwrap_or_else(|| "us".to_string()),
        language: request.language.unwrap_or_else(|| "en".to_string()),
    };

    // Fan-out 1: provider queries
    let raw_results = engines.query_all(&providers, &ctx).await;
    info!(
        project_id = %project_id,
        query = %ctx.query,
        requested = providers.len(),
        answered = raw_results.len(),
        "Provider fan-out complete"
    );

    // Fan-out 2: sentiment enrichment, merged back 1:1 by position
    let insights = sentiment_enricher::enrich_all(sentiment, &raw_results, &ctx.target_domain).await;

    let checked_at = time::now();
    let checks: Vec<VisibilityCheck> = raw_results
        .into_iter()
        .zip(insights)
        .map(|(raw, insight)| {
            VisibilityCheck::from_observation(
                project_id,
                &ctx.query,
                request.keyword_id.clone(),
                &ctx.region,
                &ctx.language,
                raw,
                insight,
                checked_at,
            )
        })
        .collect();

    // Fan-out 3: independent writes; a failed row never blocks siblings
    let writes = checks.into_iter().map(|check| async move {
        match crate::db::checks::insert_check(pool, &check).await {
            Ok(()) => Ok(check),
            Err(e) => {
                error!(
                    provider = %check.provider,
                    error = %e,
                    "Check row failed to persist"
                );
                Err(WriteFailure {
                    provider: check.provider,
                    message: e.to_string(),
                })
            }
        }
    });

    let mut stored = Vec::new();
    let mut failed_writes = Vec::new();
    for outcome in join_all(writes).await {
        match outcome {
            Ok(check) => stored.push(check),
            Err(failure) => failed_writes.push(failure),
        }
    }

    info!(
        project_id = %project_id,
        stored = stored.len(),
        failed = failed_writes.len(),
        "Check batch persisted"
    );

    Ok(CheckBatchOutcome { stored, failed_writes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, Competitor, Plan, Project};
    use crate::providers::mock::MockEngine;
    use chrono::Utc;

    async fn seeded(plan: Plan) -> (SqlitePool, Account, Project) {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();

        let account = Account {
            guid: Uuid::new_v4(),
            email: "owner@acme.com".to_string(),
            plan,
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
        crate::db::projects::insert_competitor(
            &pool,
            &Competitor {
                guid: Uuid::new_v4(),
                project_id: project.guid,
                domain: "rival.com".to_string(),
                name: None,
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();

        (pool, account, project)
    }

    fn request(providers: Vec<Provider>) -> CheckRequest {
        CheckRequest {
            query: "best tool".to_string(),
            providers,
            competitors: None,
            keyword_id: None,
            region: None,
            language: None,
        }
    }

    #[tokio::test]
    async fn test_batch_stores_one_row_per_answering_provider() {
        let (pool, account, project) = seeded(Plan::Pro).await;
        let engines = ProviderPool::new(vec![
            Arc::new(MockEngine::answering(Provider::Chatgpt, "Acme wins.")),
            Arc::new(MockEngine::answering(Provider::Claude, "Rival wins.")),
        ]);

        let outcome = run_check(
            &pool,
            &engines,
            None,
            account.guid,
            project.guid,
            request(vec![Provider::Chatgpt, Provider::Claude]),
        )
        .await
        .expect("Batch failed");

        assert_eq!(outcome.stored.len(), 2);
        assert!(outcome.failed_writes.is_empty());

        let listed = crate::db::checks::list_for_project(&pool, project.guid, None, None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_output_providers_subset_of_requested() {
        let (pool, account, project) = seeded(Plan::Pro).await;
        let engines = ProviderPool::new(vec![
            Arc::new(MockEngine::answering(Provider::Chatgpt, "Acme wins.")),
            Arc::new(MockEngine::failing(Provider::Claude)),
        ]);

        let requested = vec![Provider::Chatgpt, Provider::Claude, Provider::Gemini];
        let outcome = run_check(
            &pool,
            &engines,
            None,
            account.guid,
            project.guid,
            request(requested.clone()),
        )
        .await
        .expect("Batch failed");

        assert!(outcome.stored.len() <= requested.len());
        for check in &outcome.stored {
            assert!(requested.contains(&check.provider));
        }
        // Claude failed, Gemini unregistered: only chatgpt stored
        assert_eq!(outcome.stored.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_provider_list_is_rejected() {
        let (pool, account, project) = seeded(Plan::Pro).await;
        let engines = ProviderPool::new(vec![]);

        let result = run_check(
            &pool,
            &engines,
            None,
            account.guid,
            project.guid,
            request(vec![]),
        )
        .await;
        assert!(matches!(result, Err(CheckError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let (pool, _account, project) = seeded(Plan::Pro).await;
        let engines = ProviderPool::new(vec![]);

        let result = run_check(
            &pool,
            &engines,
            None,
            Uuid::new_v4(),
            project.guid,
            request(vec![Provider::Chatgpt]),
        )
        .await;
        assert!(matches!(result, Err(CheckError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unowned_project_is_not_found() {
        let (pool, _account, project) = seeded(Plan::Pro).await;

        // A different account that does exist
        let other = Account {
            guid: Uuid::new_v4(),
            email: "other@else.com".to_string(),
            plan: Plan::Pro,
            created_at: Utc::now(),
        };
        crate::db::accounts::insert_account(&pool, &other).await.unwrap();

        let engines = ProviderPool::new(vec![Arc::new(MockEngine::answering(
            Provider::Chatgpt,
            "Acme wins.",
        ))]);

        let result = run_check(
            &pool,
            &engines,
            None,
            other.guid,
            project.guid,
            request(vec![Provider::Chatgpt]),
        )
        .await;
        assert!(matches!(result, Err(CheckError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_quota_denial_stores_nothing() {
        let (pool, account, project) = seeded(Plan::Free).await;
        let engines = ProviderPool::new(vec![Arc::new(MockEngine::answering(
            Provider::Chatgpt,
            "Acme wins.",
        ))]);

        // Exhaust the free budget
        for _ in 0..Plan::Free.monthly_check_limit() {
            run_check(
                &pool,
                &engines,
                None,
                account.guid,
                project.guid,
                request(vec![Provider::Chatgpt]),
            )
            .await
            .expect("Batch within budget failed");
        }

        let denied = run_check(
            &pool,
            &engines,
            None,
            account.guid,
            project.guid,
            request(vec![Provider::Chatgpt]),
        )
        .await;
        assert!(matches!(denied, Err(CheckError::Quota(QuotaError::LimitReached { .. }))));

        let total = crate::db::checks::list_for_project(&pool, project.guid, None, None)
            .await
            .unwrap()
            .len() as u64;
        assert_eq!(total, Plan::Free.monthly_check_limit());
    }

    #[tokio::test]
    async fn test_tracked_competitors_are_scanned_by_default() {
        let (pool, account, project) = seeded(Plan::Pro).await;
        let engines = ProviderPool::new(vec![Arc::new(MockEngine::answering(
            Provider::Chatgpt,
            "Rival beats everyone.",
        ))]);

        let outcome = run_check(
            &pool,
            &engines,
            None,
            account.guid,
            project.guid,
            request(vec![Provider::Chatgpt]),
        )
        .await
        .expect("Batch failed");

        let mentions = &outcome.stored[0].competitor_mentions;
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].domain, "rival.com");
        assert!(mentions[0].mentioned);
    }

    #[tokio::test]
    async fn test_competitor_override_replaces_tracked_list() {
        let (pool, account, project) = seeded(Plan::Pro).await;
        let engines = ProviderPool::new(vec![Arc::new(MockEngine::answering(
            Provider::Chatgpt,
            "Upstart is trending.",
        ))]);

        let mut req = request(vec![Provider::Chatgpt]);
        req.competitors = Some(vec!["upstart.dev".to_string()]);

        let outcome = run_check(&pool, &engines, None, account.guid, project.guid, req)
            .await
            .expect("Batch failed");

        let mentions = &outcome.stored[0].competitor_mentions;
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].domain, "upstart.dev");
    }

    #[tokio::test]
    async fn test_duplicate_providers_charged_once() {
        let (pool, account, project) = seeded(Plan::Pro).await;
        let engines = ProviderPool::new(vec![Arc::new(MockEngine::answering(
            Provider::Chatgpt,
            "Acme wins.",
        ))]);

        let outcome = run_check(
            &pool,
            &engines,
            None,
            account.guid,
            project.guid,
            request(vec![Provider::Chatgpt, Provider::Chatgpt]),
        )
        .await
        .expect("Batch failed");

        assert_eq!(outcome.stored.len(), 1);
    }
}
