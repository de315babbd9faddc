//! Content gap detection
//!
//! A gap is a tracked query where competitors are mentioned but the brand
//! never is, across every check for that query.

use crate::models::VisibilityCheck;
use serde::Serialize;
use std::collections::HashMap;

/// One detected gap: a query the brand is absent from while at least one
/// competitor is cited
#[derive(Debug, Clone, Serialize)]
pub struct ContentGap {
    pub query: String,
    /// Competitor domains mentioned anywhere in the query's checks, in
    /// first-appearance order
    pub competitors_cited: Vec<String>,
}

/// Find gap queries in a check set
///
/// Checks are grouped by exact (case-sensitive) query text. For each
/// group, `brand_mentioned` is OR'd across checks and mentioned competitor
/// domains are unioned. Output order is first appearance of each query in
/// the input; each gap query appears exactly once.
pub fn find_gaps(checks: &[VisibilityCheck]) -> Vec<ContentGap> {
    struct Group {
        brand_mentioned: bool,
        competitors: Vec<String>,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Group> = HashMap::new();

    for check in checks {
        let group = groups.entry(check.query.as_str()).or_insert_with(|| {
            order.push(check.query.as_str());
            Group {
                brand_mentioned: false,
                competitors: Vec::new(),
            }
        });

        group.brand_mentioned |= check.brand_mentioned;
        for mention in &check.competitor_mentions {
            if mention.mentioned && !group.competitors.contains(&mention.domain) {
                group.competitors.push(mention.domain.clone());
            }
        }
    }

    order
        .into_iter()
        .filter_map(|query| {
            let group = groups.remove(query)?;
            if !group.brand_mentioned && !group.competitors.is_empty() {
                Some(ContentGap {
                    query: query.to_string(),
                    competitors_cited: group.competitors,
                })
            } else {
                None
            }
        })
        .collect()
}
