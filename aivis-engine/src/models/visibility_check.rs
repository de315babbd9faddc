//! Visibility check observation model

use crate::types::{CompetitorMention, Provider, RawCheckResult, SentimentInsight, SentimentLabel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One stored observation: provider x query x time
///
/// Rows are append-only. Sentiment fields are filled by enrichment before
/// the row is first persisted; a row is never updated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct VisibilityCheck {
    pub guid: Uuid,
    pub project_id: Uuid,
    pub provider: Provider,
    pub query: String,
    /// Optional back-reference to a tracked keyword; no ownership implied
    pub keyword_id: Option<String>,
    pub response_text: Option<String>,
    pub brand_mentioned: bool,
    pub url_cited: bool,
    pub cited_url: Option<String>,
    pub citation_position: Option<u32>,
    /// One entry per tracked competitor domain, unique within this check
    pub competitor_mentions: Vec<CompetitorMention>,
    pub sentiment: Option<SentimentLabel>,
    pub brand_description: Option<String>,
    pub region: String,
    pub language: String,
    pub checked_at: DateTime<Utc>,
}

impl VisibilityCheck {
    /// Build a check row from a scanned provider result and its optional
    /// sentiment enrichment
    pub fn from_observation(
        project_id: Uuid,
        query: &str,
        keyword_id: Option<String>,
        region: &str,
        language: &str,
        raw: RawCheckResult,
        insight: Option<SentimentInsight>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        let (sentiment, brand_description) = match insight {
            Some(insight) => (Some(insight.sentiment), Some(insight.brand_description)),
            None => (None, None),
        };

        Self {
            guid: Uuid::new_v4(),
            project_id,
            provider: raw.provider,
            query: query.to_string(),
            keyword_id,
            response_text: raw.response_text,
            brand_mentioned: raw.brand_mentioned,
            url_cited: raw.url_cited,
            cited_url: raw.cited_url,
            citation_position: raw.citation_position,
            competitor_mentions: raw.competitor_mentions,
            sentiment,
            brand_description,
            region: region.to_string(),
            language: language.to_string(),
            checked_at,
        }
    }

    /// Count of distinct competitor domains marked mentioned in this check
    pub fn mentioned_competitor_count(&self) -> usize {
        self.competitor_mentions.iter().filter(|m| m.mentioned).count()
    }
}
