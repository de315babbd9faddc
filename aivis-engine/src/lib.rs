//! aivis-engine library interface
//!
//! Exposes the application state and router for the binary and for
//! integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use crate::config::EngineConfig;
use crate::providers::ProviderPool;
use crate::services::backlink_client;
use crate::services::recommendation_generator::{
    DefaultRecommendationPolicy, RecommendationPolicy,
};
use crate::services::score_engine::{ScoreModel, WeightedScoreModel};
use crate::services::sentiment::OpenAiSentimentAnalyzer;
use crate::types::{BacklinkIndex, SentimentAnalyzer};
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Registered answer engines
    pub engines: Arc<ProviderPool>,
    /// Sentiment analyzer, present only when a credential is configured
    pub sentiment: Option<Arc<dyn SentimentAnalyzer>>,
    /// Backlink index feeding the authority signal
    pub backlinks: Arc<dyn BacklinkIndex>,
    /// Composite scoring model
    pub score_model: Arc<dyn ScoreModel>,
    /// Recommendation ranking policy
    pub policy: Arc<dyn RecommendationPolicy>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Assemble state from explicit capabilities (tests inject mocks here)
    pub fn new(
        db: SqlitePool,
        engines: Arc<ProviderPool>,
        sentiment: Option<Arc<dyn SentimentAnalyzer>>,
        backlinks: Arc<dyn BacklinkIndex>,
    ) -> Self {
        Self {
            db,
            engines,
            sentiment,
            backlinks,
            score_model: Arc::new(WeightedScoreModel::new()),
            policy: Arc::new(DefaultRecommendationPolicy),
            startup_time: Utc::now(),
        }
    }

    /// Assemble state from resolved configuration
    pub fn from_config(db: SqlitePool, config: &EngineConfig) -> Self {
        let engines = Arc::new(ProviderPool::from_config(config));
        let sentiment: Option<Arc<dyn SentimentAnalyzer>> = config
            .openai_api_key
            .as_ref()
            .map(|key| Arc::new(OpenAiSentimentAnalyzer::new(key.clone())) as Arc<dyn SentimentAnalyzer>);
        let backlinks = backlink_client::backlink_index_from_config(config);

        Self::new(db, engines, sentiment, backlinks)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::check_routes())
        .merge(api::trend_routes())
        .merge(api::gap_routes())
        .merge(api::recommendation_routes())
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}
