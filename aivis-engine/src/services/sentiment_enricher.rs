//! Best-effort sentiment enrichment of a check batch
//!
//! Enrichment runs concurrently across qualifying results and merges back
//! 1:1 by position. Any individual failure becomes `None` for that result
//! and never aborts or fails sibling calls or the batch.

use crate::types::{RawCheckResult, SentimentAnalyzer, SentimentInsight};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// A result qualifies for enrichment when the brand was mentioned and
/// there is response text to classify
fn qualifies(result: &RawCheckResult) -> bool {
    result.brand_mentioned
        && result
            .response_text
            .as_deref()
            .is_some_and(|text| !text.is_empty())
}

/// Enrich a batch of raw results, position-aligned
///
/// With no analyzer configured, every result is skipped (not attempted).
pub async fn enrich_all(
    analyzer: Option<&Arc<dyn SentimentAnalyzer>>,
    results: &[RawCheckResult],
    target_domain: &str,
) -> Vec<Option<SentimentInsight>> {
    let analyzer = match analyzer {
        Some(analyzer) => analyzer,
        None => return vec![None; results.len()],
    };

    let futures = results.iter().map(|result| {
        let analyzer = Arc::clone(analyzer);
        let target_domain = target_domain.to_string();
        async move {
            if !qualifies(result) {
                return None;
            }
            let text = result.response_text.as_deref().unwrap_or_default();
            match analyzer.analyze(text, &target_domain).await {
                Ok(insight) => {
                    debug!(
                        provider = %result.provider,
                        sentiment = insight.sentiment.as_str(),
                        "Sentiment enrichment successful"
                    );
                    Some(insight)
                }
                Err(e) => {
                    warn!(
                        provider = %result.provider,
                        error = %e,
                        "Sentiment enrichment failed (isolated, batch continues)"
                    );
                    None
                }
            }
        }
    });

    join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Provider, SentimentError, SentimentLabel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedAnalyzer {
        fail_on_text: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedAnalyzer {
        fn new() -> Self {
            Self {
                fail_on_text: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_on(text: &str) -> Self {
            Self {
                fail_on_text: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl SentimentAnalyzer for ScriptedAnalyzer {
        async fn analyze(
            &self,
            response_text: &str,
            _target_domain: &str,
        ) -> Result<SentimentInsight, SentimentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_text.as_deref() == Some(response_text) {
                return Err(SentimentError::Network("scripted failure".to_string()));
            }
            Ok(SentimentInsight {
                sentiment: SentimentLabel::Positive,
                brand_description: "Well regarded.".to_string(),
            })
        }
    }

    fn result(provider: Provider, mentioned: bool, text: Option<&str>) -> RawCheckResult {
        RawCheckResult {
            provider,
            response_text: text.map(|t| t.to_string()),
            brand_mentioned: mentioned,
            url_cited: false,
            cited_url: None,
            citation_position: None,
            competitor_mentions: vec![],
        }
    }

    #[tokio::test]
    async fn test_output_is_position_aligned() {
        let analyzer: Arc<dyn SentimentAnalyzer> = Arc::new(ScriptedAnalyzer::new());
        let results = vec![
            result(Provider::Chatgpt, true, Some("Acme is great")),
            result(Provider::Claude, false, Some("No brand here")),
            result(Provider::Gemini, true, Some("Acme again")),
        ];

        let insights = enrich_all(Some(&analyzer), &results, "acme.com").await;
        assert_eq!(insights.len(), 3);
        assert!(insights[0].is_some());
        assert!(insights[1].is_none());
        assert!(insights[2].is_some());
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_result() {
        let analyzer: Arc<dyn SentimentAnalyzer> =
            Arc::new(ScriptedAnalyzer::failing_on("bad response"));
        let results = vec![
            result(Provider::Chatgpt, true, Some("bad response")),
            result(Provider::Claude, true, Some("good response")),
        ];

        let insights = enrich_all(Some(&analyzer), &results, "acme.com").await;
        assert!(insights[0].is_none());
        assert!(insights[1].is_some());
    }

    #[tokio::test]
    async fn test_non_qualifying_results_are_skipped_not_attempted() {
        let analyzer = Arc::new(ScriptedAnalyzer::new());
        let results = vec![
            result(Provider::Chatgpt, false, Some("text")),
            result(Provider::Claude, true, None),
            result(Provider::Gemini, true, Some("")),
        ];

        let handle: Arc<dyn SentimentAnalyzer> = analyzer.clone();
        let insights = enrich_all(Some(&handle), &results, "acme.com").await;
        assert!(insights.iter().all(Option::is_none));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_analyzer_skips_everything() {
        let results = vec![result(Provider::Chatgpt, true, Some("Acme is great"))];
        let insights = enrich_all(None, &results, "acme.com").await;
        assert_eq!(insights, vec![None]);
    }
}
