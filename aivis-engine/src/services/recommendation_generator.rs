//! Recommendation input assembly and ranking
//!
//! Assembles the three input sets the ranking policy works from:
//! content gaps, platform-relevant on-page issues from the latest crawl,
//! and per-provider week-over-week mention-rate movement. The ranking
//! itself is a replaceable policy; a default priority-ordered policy
//! ships here.

use crate::models::VisibilityCheck;
use crate::services::gap_detector::{find_gaps, ContentGap};
use crate::services::trend_analyzer::{provider_mention_deltas, ProviderTrend, TrendDirection};
use crate::types::Provider;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// On-page issue codes each platform is known to weigh
///
/// Intersected with the project's latest crawl findings to produce the
/// platform-issue input set.
fn platform_issue_codes(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Chatgpt => &["missing-schema-markup", "thin-content", "missing-faq"],
        Provider::Claude => &["thin-content", "poor-heading-structure"],
        Provider::Gemini => &["missing-schema-markup", "low-crawlability"],
        Provider::Perplexity => &["missing-meta-description", "thin-content"],
        Provider::AiOverviews => &["missing-schema-markup", "low-crawlability", "slow-page"],
    }
}

/// Issues from the latest crawl that a specific platform cares about
#[derive(Debug, Clone, Serialize)]
pub struct PlatformIssues {
    pub provider: Provider,
    pub issue_codes: Vec<String>,
}

/// The three assembled input sets for the ranking policy
#[derive(Debug, Serialize)]
pub struct RecommendationInputs {
    pub gaps: Vec<ContentGap>,
    pub platform_issues: Vec<PlatformIssues>,
    pub provider_trends: Vec<ProviderTrend>,
}

/// Assemble recommendation inputs from stored checks and the latest crawl
pub fn assemble_inputs(
    checks: &[VisibilityCheck],
    crawl_issue_codes: &[String],
    now: DateTime<Utc>,
) -> RecommendationInputs {
    let platform_issues = Provider::ALL
        .into_iter()
        .filter_map(|provider| {
            let relevant: Vec<String> = platform_issue_codes(provider)
                .iter()
                .filter(|code| crawl_issue_codes.iter().any(|c| c == *code))
                .map(|code| code.to_string())
                .collect();
            if relevant.is_empty() {
                None
            } else {
                Some(PlatformIssues {
                    provider,
                    issue_codes: relevant,
                })
            }
        })
        .collect();

    RecommendationInputs {
        gaps: find_gaps(checks),
        platform_issues,
        provider_trends: provider_mention_deltas(checks, now),
    }
}

/// Recommendation priority bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Category of a ranked action item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ContentGap,
    OnPageFix,
    ProviderDecline,
}

/// One ranked action item
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub detail: String,
}

/// Ranking/prioritization policy over assembled inputs
pub trait RecommendationPolicy: Send + Sync {
    fn rank(&self, inputs: &RecommendationInputs) -> Vec<Recommendation>;
}

/// Default policy: gaps first, then declining providers, then on-page
/// fixes, stable within each bucket
pub struct DefaultRecommendationPolicy;

impl RecommendationPolicy for DefaultRecommendationPolicy {
    fn rank(&self, inputs: &RecommendationInputs) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        for gap in &inputs.gaps {
            recommendations.push(Recommendation {
                kind: RecommendationKind::ContentGap,
                priority: Priority::High,
                title: format!("Create content answering \"{}\"", gap.query),
                detail: format!(
                    "Competitors cited for this query: {}. The brand is never mentioned.",
                    gap.competitors_cited.join(", ")
                ),
            });
        }

        for trend in &inputs.provider_trends {
            if trend.direction == TrendDirection::Down {
                recommendations.push(Recommendation {
                    kind: RecommendationKind::ProviderDecline,
                    priority: Priority::Medium,
                    title: format!("Investigate falling visibility on {}", trend.provider),
                    detail: format!(
                        "Mention rate moved from {:.0}% to {:.0}% week over week.",
                        trend.previous_rate * 100.0,
                        trend.current_rate * 100.0
                    ),
                });
            }
        }

        for issues in &inputs.platform_issues {
            recommendations.push(Recommendation {
                kind: RecommendationKind::OnPageFix,
                priority: Priority::Medium,
                title: format!("Fix on-page issues holding back {}", issues.provider),
                detail: format!("Crawl found: {}.", issues.issue_codes.join(", ")),
            });
        }

        recommendations.sort_by_key(|r| r.priority);
        recommendations
    }
}
