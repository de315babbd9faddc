//! Core types and trait definitions for the visibility pipeline
//!
//! Defines the capability seams consumed by the check orchestrator:
//! - `AnswerEngine`: one implementation per answer-engine provider
//! - `SentimentAnalyzer`: best-effort response sentiment classification
//! - `BacklinkIndex`: referring-domain summary for the brand domain
//!
//! Concrete implementations live in `providers/` and `services/`; the
//! orchestrator only sees these traits, so tests can substitute mocks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Providers
// ============================================================================

/// Answer-engine provider identifiers
///
/// `AiOverviews` is the AI-mode search modality. It is analytically
/// distinct from the conversational assistants and is partitioned into its
/// own subset by every aggregation (see `services::score_engine`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Chatgpt,
    Claude,
    Gemini,
    Perplexity,
    AiOverviews,
}

impl Provider {
    /// All known providers, in display order
    pub const ALL: [Provider; 5] = [
        Provider::Chatgpt,
        Provider::Claude,
        Provider::Gemini,
        Provider::Perplexity,
        Provider::AiOverviews,
    ];

    /// Stable string form used in the database and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Chatgpt => "chatgpt",
            Provider::Claude => "claude",
            Provider::Gemini => "gemini",
            Provider::Perplexity => "perplexity",
            Provider::AiOverviews => "ai_overviews",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Provider> {
        match s {
            "chatgpt" => Some(Provider::Chatgpt),
            "claude" => Some(Provider::Claude),
            "gemini" => Some(Provider::Gemini),
            "perplexity" => Some(Provider::Perplexity),
            "ai_overviews" => Some(Provider::AiOverviews),
            _ => None,
        }
    }

    /// Whether this provider is the AI-mode search modality
    /// (as opposed to a conversational assistant)
    pub fn is_ai_search(&self) -> bool {
        matches!(self, Provider::AiOverviews)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Query context and raw results
// ============================================================================

/// One query as presented to every answer engine in a batch
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Free-text query to put to the engine
    pub query: String,
    /// The brand domain being tracked (e.g. "acme.com")
    pub target_domain: String,
    /// Tracked competitor domains, in project order
    pub competitor_domains: Vec<String>,
    /// Two-letter region code (default "us")
    pub region: String,
    /// Two-letter language code (default "en")
    pub language: String,
}

/// Raw answer returned by a single engine, before mention scanning
#[derive(Debug, Clone)]
pub struct EngineAnswer {
    /// Response text produced by the engine
    pub text: String,
    /// URLs the engine surfaced as sources, in the engine's order
    pub citations: Vec<String>,
}

/// Per-competitor mention outcome within a single check
///
/// Domains are unique within one check; `position` is the 1-based rank of
/// the competitor's first occurrence among all mentioned domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorMention {
    pub domain: String,
    pub mentioned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

/// One provider's scanned observation for a query
///
/// Produced by the provider pool, consumed by enrichment and persistence.
#[derive(Debug, Clone)]
pub struct RawCheckResult {
    pub provider: Provider,
    pub response_text: Option<String>,
    pub brand_mentioned: bool,
    pub url_cited: bool,
    pub cited_url: Option<String>,
    pub citation_position: Option<u32>,
    pub competitor_mentions: Vec<CompetitorMention>,
}

// ============================================================================
// Answer engine trait
// ============================================================================

/// Answer engine errors
///
/// Failures are isolated per provider: the pool logs the error and omits
/// the provider from the batch instead of failing siblings.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Empty response from engine")]
    EmptyResponse,
}

/// One answer-engine provider client
///
/// Implementations perform the external query and return the raw answer
/// text plus any cited URLs. Mention scanning is done by the pool, not the
/// client, so all engines share one scanning implementation.
#[async_trait::async_trait]
pub trait AnswerEngine: Send + Sync {
    /// Which provider this engine queries
    fn provider(&self) -> Provider;

    /// Put the query to the engine and return its raw answer
    async fn query(&self, ctx: &QueryContext) -> Result<EngineAnswer, EngineError>;
}

// ============================================================================
// Sentiment analysis trait
// ============================================================================

/// Sentiment classification of a brand mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Stable string form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<SentimentLabel> {
        match s {
            "positive" => Some(SentimentLabel::Positive),
            "neutral" => Some(SentimentLabel::Neutral),
            "negative" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }
}

/// Successful sentiment enrichment of one check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentInsight {
    /// Overall sentiment toward the brand in the response
    pub sentiment: SentimentLabel,
    /// One-sentence summary of how the response describes the brand
    pub brand_description: String,
}

/// Sentiment analyzer errors
#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Best-effort sentiment classification capability
///
/// Enrichment failures never fail a batch; the enricher converts them to
/// `None` per result.
#[async_trait::async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// Classify sentiment toward `target_domain` within `response_text`
    async fn analyze(
        &self,
        response_text: &str,
        target_domain: &str,
    ) -> Result<SentimentInsight, SentimentError>;
}

// ============================================================================
// Backlink index trait
// ============================================================================

/// Backlink profile summary for a domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklinkSummary {
    /// Number of distinct referring domains
    pub referring_domains: u64,
}

/// Backlink index errors
#[derive(Debug, Error)]
pub enum BacklinkError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Backlink-summary capability keyed by brand domain
#[async_trait::async_trait]
pub trait BacklinkIndex: Send + Sync {
    /// Summarize the backlink profile of `domain`
    async fn summary(&self, domain: &str) -> Result<BacklinkSummary, BacklinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(Provider::parse(provider.as_str()), Some(provider));
        }
        assert_eq!(Provider::parse("bing"), None);
    }

    #[test]
    fn test_only_ai_overviews_is_ai_search() {
        let search: Vec<Provider> = Provider::ALL
            .into_iter()
            .filter(Provider::is_ai_search)
            .collect();
        assert_eq!(search, vec![Provider::AiOverviews]);
    }

    #[test]
    fn test_provider_serde_uses_snake_case() {
        let json = serde_json::to_string(&Provider::AiOverviews).unwrap();
        assert_eq!(json, "\"ai_overviews\"");

        let parsed: Provider = serde_json::from_str("\"chatgpt\"").unwrap();
        assert_eq!(parsed, Provider::Chatgpt);
    }

    #[test]
    fn test_sentiment_label_round_trip() {
        for label in [
            SentimentLabel::Positive,
            SentimentLabel::Neutral,
            SentimentLabel::Negative,
        ] {
            assert_eq!(SentimentLabel::parse(label.as_str()), Some(label));
        }
        assert_eq!(SentimentLabel::parse("mixed"), None);
    }

    #[test]
    fn test_competitor_mention_json_shape() {
        let mention = CompetitorMention {
            domain: "rival.com".to_string(),
            mentioned: true,
            position: Some(2),
        };
        let json = serde_json::to_value(&mention).unwrap();
        assert_eq!(json["domain"], "rival.com");
        assert_eq!(json["mentioned"], true);
        assert_eq!(json["position"], 2);

        let unmentioned = CompetitorMention {
            domain: "other.io".to_string(),
            mentioned: false,
            position: None,
        };
        let json = serde_json::to_value(&unmentioned).unwrap();
        assert!(json.get("position").is_none());
    }
}
