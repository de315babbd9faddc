//! End-to-end pipeline scenarios at the service level
//!
//! Runs check batches through the orchestrator with scripted engines,
//! reads the stored rows back, and verifies the analytics over them.

use aivis_engine::models::{Account, Competitor, Plan, Project};
use aivis_engine::providers::ProviderPool;
use aivis_engine::services::check_orchestrator::{run_check, CheckRequest};
use aivis_engine::services::gap_detector::find_gaps;
use aivis_engine::services::score_engine::{compute_score_inputs, WeightedScoreModel};
use aivis_engine::services::trend_analyzer::{compute_trend, TrendDirection};
use aivis_engine::types::{AnswerEngine, EngineAnswer, EngineError, Provider, QueryContext};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

struct ScriptedEngine {
    provider: Provider,
    text: &'static str,
}

#[async_trait::async_trait]
impl AnswerEngine for ScriptedEngine {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn query(&self, _ctx: &QueryContext) -> Result<EngineAnswer, EngineError> {
        Ok(EngineAnswer {
            text: self.text.to_string(),
            citations: Vec::new(),
        })
    }
}

async fn seeded_project() -> (SqlitePool, Account, Project) {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    aivis_engine::db::init_tables(&pool)
        .await
        .expect("Failed to initialize schema");

    let account = Account {
        guid: Uuid::new_v4(),
        email: "owner@acme.com".to_string(),
        plan: Plan::Pro,
        created_at: Utc::now(),
    };
    aivis_engine::db::accounts::insert_account(&pool, &account)
        .await
        .unwrap();

    let project = Project {
        guid: Uuid::new_v4(),
        account_id: account.guid,
        name: "Acme".to_string(),
        domain: "acme.com".to_string(),
        created_at: Utc::now(),
    };
    aivis_engine::db::projects::insert_project(&pool, &project)
        .await
        .unwrap();
    aivis_engine::db::projects::insert_competitor(
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

fn request(query: &str, providers: Vec<Provider>) -> CheckRequest {
    CheckRequest {
        query: query.to_string(),
        providers,
        competitors: None,
        keyword_id: None,
        region: None,
        language: None,
    }
}

#[tokio::test]
async fn scenario_mixed_mentions_yield_even_share_of_voice_and_no_gap() {
    let (pool, account, project) = seeded_project().await;

    // chatgpt mentions the brand; claude mentions only the competitor
    let engines = ProviderPool::new(vec![
        Arc::new(ScriptedEngine {
            provider: Provider::Chatgpt,
            text: "Acme is widely regarded as the best tool.",
        }),
        Arc::new(ScriptedEngine {
            provider: Provider::Claude,
            text: "Rival is the one most users pick.",
        }),
    ]);

    let outcome = run_check(
        &pool,
        &engines,
        None,
        account.guid,
        project.guid,
        request("best tool", vec![Provider::Chatgpt, Provider::Claude]),
    )
    .await
    .expect("Batch failed");
    assert_eq!(outcome.stored.len(), 2);

    let checks = aivis_engine::db::checks::list_for_project(&pool, project.guid, None, None)
        .await
        .unwrap();

    // One brand mention, one competitor mention across two llm checks
    let inputs = compute_score_inputs(&checks, 0.0);
    assert_eq!(inputs.share_of_voice, 0.5);
    assert_eq!(inputs.llm_mention_rate, 0.5);
    assert_eq!(inputs.ai_search_presence_rate, 0.0);

    // Brand is mentioned in at least one check for the query: no gap
    assert!(find_gaps(&checks).is_empty());
}

#[tokio::test]
async fn scenario_competitor_only_query_is_reported_as_gap() {
    let (pool, account, project) = seeded_project().await;

    let engines = ProviderPool::new(vec![Arc::new(ScriptedEngine {
        provider: Provider::Chatgpt,
        text: "For this, Rival is the tool to look at.",
    })]);

    run_check(
        &pool,
        &engines,
        None,
        account.guid,
        project.guid,
        request("alt tool", vec![Provider::Chatgpt]),
    )
    .await
    .expect("Batch failed");

    let checks = aivis_engine::db::checks::list_for_project(&pool, project.guid, None, None)
        .await
        .unwrap();

    let gaps = find_gaps(&checks);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].query, "alt tool");
    assert_eq!(gaps[0].competitors_cited, vec!["rival.com"]);
}

#[tokio::test]
async fn scenario_fresh_project_trend_has_no_previous_window() {
    let (pool, account, project) = seeded_project().await;

    let engines = ProviderPool::new(vec![Arc::new(ScriptedEngine {
        provider: Provider::Chatgpt,
        text: "Acme is the answer.",
    })]);

    run_check(
        &pool,
        &engines,
        None,
        account.guid,
        project.guid,
        request("best tool", vec![Provider::Chatgpt]),
    )
    .await
    .expect("Batch failed");

    let checks = aivis_engine::db::checks::list_for_project(&pool, project.guid, None, None)
        .await
        .unwrap();

    let model = WeightedScoreModel::new();
    let report = compute_trend(&checks, Utc::now(), 0.0, &model);

    assert!(report.previous.is_none());
    assert_eq!(report.delta, 0.0);
    assert_eq!(report.direction, TrendDirection::Stable);
    assert_eq!(report.current.checks, 1);
    assert!(report.audience_current > 0.0);
}

#[tokio::test]
async fn scenario_ai_search_modality_is_partitioned_separately() {
    let (pool, account, project) = seeded_project().await;

    // Only the AI-mode search provider answers, mentioning the brand
    let engines = ProviderPool::new(vec![Arc::new(ScriptedEngine {
        provider: Provider::AiOverviews,
        text: "Acme appears in the overview.",
    })]);

    run_check(
        &pool,
        &engines,
        None,
        account.guid,
        project.guid,
        request("best tool", vec![Provider::AiOverviews]),
    )
    .await
    .expect("Batch failed");

    let checks = aivis_engine::db::checks::list_for_project(&pool, project.guid, None, None)
        .await
        .unwrap();

    let inputs = compute_score_inputs(&checks, 0.0);
    assert_eq!(inputs.ai_search_presence_rate, 1.0);
    assert_eq!(inputs.llm_mention_rate, 0.0);
    assert_eq!(inputs.share_of_voice, 0.0);
}
