//! Backlink-summary client
//!
//! Fetches the referring-domain count that feeds the authority score
//! input. When no backlink credential is configured the null index is
//! used instead, reporting zero referring domains.

use crate::types::{BacklinkError, BacklinkIndex, BacklinkSummary};
use crate::config::EngineConfig;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.backlinkindex.io";
const REQUESTS_PER_SECOND: u32 = 2;

/// Backlink summary API response
#[derive(Debug, Deserialize)]
struct SummaryResponse {
    referring_domains: u64,
}

/// HTTP backlink index client
pub struct HttpBacklinkIndex {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    base_url: String,
    api_key: String,
}

impl HttpBacklinkIndex {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
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
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl BacklinkIndex for HttpBacklinkIndex {
    async fn summary(&self, domain: &str) -> Result<BacklinkSummary, BacklinkError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v1/domains/{}/summary", self.base_url, domain);
        tracing::debug!(domain = domain, "Querying backlink index");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| BacklinkError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BacklinkError::Api(status.as_u16(), error_text));
        }

        let summary: SummaryResponse = response
            .json()
            .await
            .map_err(|e| BacklinkError::Parse(e.to_string()))?;

        Ok(BacklinkSummary {
            referring_domains: summary.referring_domains,
        })
    }
}

/// Null index used when no backlink credential is configured
pub struct NullBacklinkIndex;

#[async_trait::async_trait]
impl BacklinkIndex for NullBacklinkIndex {
    async fn summary(&self, _domain: &str) -> Result<BacklinkSummary, BacklinkError> {
        Ok(BacklinkSummary {
            referring_domains: 0,
        })
    }
}

/// Choose the backlink index implementation for a configuration
pub fn backlink_index_from_config(config: &EngineConfig) -> Arc<dyn BacklinkIndex> {
    match &config.backlink_api_key {
        Some(key) => Arc::new(HttpBacklinkIndex::new(
            key.clone(),
            config.backlink_api_url.clone(),
        )),
        None => {
            tracing::info!("No backlink credential configured; authority signal will be 0");
            Arc::new(NullBacklinkIndex)
        }
    }
}
