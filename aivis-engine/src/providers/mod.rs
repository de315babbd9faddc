//! Answer-engine provider clients and the fan-out pool
//!
//! One client module per provider, all implementing the `AnswerEngine`
//! trait from `types`. The `ProviderPool` runs a requested subset of
//! providers concurrently with per-provider failure isolation: a provider
//! that errors is logged and omitted from the batch, never failing its
//! siblings.

pub mod ai_overviews_client;
pub mod anthropic_client;
pub mod gemini_client;
pub mod openai_client;
pub mod perplexity_client;
pub mod scan;

use crate::config::EngineConfig;
use crate::types::{AnswerEngine, Provider, QueryContext, RawCheckResult};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of configured answer engines with concurrent fan-out
pub struct ProviderPool {
    engines: Vec<Arc<dyn AnswerEngine>>,
}

impl ProviderPool {
    /// Create a pool over the given engines
    pub fn new(engines: Vec<Arc<dyn AnswerEngine>>) -> Self {
        Self { engines }
    }

    /// Build the pool from configured credentials
    ///
    /// Providers without a credential are not registered; requesting one
    /// later yields no result row for it.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut engines: Vec<Arc<dyn AnswerEngine>> = Vec::new();

        if let Some(key) = &config.openai_api_key {
            engines.push(Arc::new(openai_client::OpenAiClient::new(key.clone())));
        }
        if let Some(key) = &config.anthropic_api_key {
            engines.push(Arc::new(anthropic_client::AnthropicClient::new(key.clone())));
        }
        if let Some(key) = &config.gemini_api_key {
            engines.push(Arc::new(gemini_client::GeminiClient::new(key.clone())));
        }
        if let Some(key) = &config.perplexity_api_key {
            engines.push(Arc::new(perplexity_client::PerplexityClient::new(key.clone())));
        }
        if let Some(key) = &config.serp_api_key {
            engines.push(Arc::new(ai_overviews_client::AiOverviewsClient::new(key.clone())));
        }

        Self { engines }
    }

    /// Providers currently registered in the pool
    pub fn registered(&self) -> Vec<Provider> {
        self.engines.iter().map(|e| e.provider()).collect()
    }

    /// Query the requested providers concurrently and scan their answers
    ///
    /// Returns at most one result per requested provider, in completion
    /// order. Unregistered providers and failed queries are omitted.
    pub async fn query_all(
        &self,
        providers: &[Provider],
        ctx: &QueryContext,
    ) -> Vec<RawCheckResult> {
        let futures = self
            .engines
            .iter()
            .filter(|engine| providers.contains(&engine.provider()))
            .map(|engine| {
                let engine = Arc::clone(engine);
                let ctx = ctx.clone();
                async move {
                    let provider = engine.provider();
                    match engine.query(&ctx).await {
                        Ok(answer) => {
                            debug!(
                                provider = %provider,
                                query = %ctx.query,
                                citations = answer.citations.len(),
                                "Provider query successful"
                            );
                            Some(scan::scan_answer(provider, &answer, &ctx))
                        }
                        Err(e) => {
                            warn!(
                                provider = %provider,
                                query = %ctx.query,
                                error = %e,
                                "Provider query failed (isolated, batch continues)"
                            );
                            None
                        }
                    }
                }
            });

        join_all(futures).await.into_iter().flatten().collect()
    }
}

// ============================================================================
// Mock Engine for Testing
// ============================================================================
