//! Google AI Overviews client (via SERP API)
//!
//! The AI-mode search provider. Unlike the conversational assistants, the
//! answer here is the AI Overview block attached to a Google results page,
//! fetched through a SERP API. A results page without an AI Overview is a
//! valid observation (the brand is simply not present), not an error.

use crate::types::{AnswerEngine, EngineAnswer, EngineError, Provider, QueryContext};
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

const SERP_BASE_URL: &str = "https://serpapi.com/search.json";
const REQUESTS_PER_SECOND: u32 = 1;

/// SERP API response, reduced to the AI Overview block
#[derive(Debug, Deserialize)]
struct SerpResponse {
    ai_overview: Option<AiOverview>,
}

#[derive(Debug, Deserialize)]
struct AiOverview {
    #[serde(default)]
    text_blocks: Vec<TextBlock>,
    #[serde(default)]
    references: Vec<Reference>,
}

#[derive(Debug, Deserialize)]
struct TextBlock {
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Reference {
    link: Option<String>,
}

/// AI Overviews client
pub struct AiOverviewsClient {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    api_key: String,
}

impl AiOverviewsClient {
    pub fn new(api_key: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(REQUESTS_PER_SECOND).expect("rate is non-zero"),
        ));

        Self {
            http_client,
            rate_limiter,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl AnswerEngine for AiOverviewsClient {
    fn provider(&self) -> Provider {
        Provider::AiOverviews
    }

    async fn query(&self, ctx: &QueryContext) -> Result<EngineAnswer, EngineError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!(query = %ctx.query, "Querying AI Overviews");

        let response = self
            .http_client
            .get(SERP_BASE_URL)
            .query(&[
                ("engine", "google"),
                ("q", ctx.query.as_str()),
                ("gl", ctx.region.as_str()),
                ("hl", ctx.language.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let status = response.status();
        if status == 401 {
            return Err(EngineError::InvalidApiKey);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::Api(status.as_u16(), error_text));
        }

        let serp: SerpResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        // No AI Overview on the results page: an empty observation
        let overview = match serp.ai_overview {
            Some(overview) => overview,
            None => {
                tracing::debug!(query = %ctx.query, "No AI Overview on results page");
                return Ok(EngineAnswer {
                    text: String::new(),
                    citations: Vec::new(),
                });
            }
        };

        let text: String = overview
            .text_blocks
            .iter()
            .filter_map(|block| block.snippet.as_deref())
            .collect::<Vec<_>>()
            .join("\n");

        let citations: Vec<String> = overview
            .references
            .into_iter()
            .filter_map(|reference| reference.link)
            .collect();

        Ok(EngineAnswer { text, citations })
    }
}
