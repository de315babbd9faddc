//! Mention and citation scanning of raw engine answers
//!
//! Pure functions, no I/O. The engine decides mentions itself rather than
//! trusting any provider-side signal, so every provider is scanned with
//! the same rules:
//!
//! - A domain is *mentioned* when its brand token (the registrable label,
//!   e.g. "acme" for "acme.com") or the full domain appears in the answer
//!   text on a word boundary, case-insensitively.
//! - A domain is *cited* when one of the answer's citation URLs belongs to
//!   it; `citation_position` is the 1-based index of the first such URL.
//! - Competitor `position` is the 1-based rank of the competitor's first
//!   text occurrence among all mentioned domains (brand included).

use crate::types::{CompetitorMention, EngineAnswer, Provider, QueryContext, RawCheckResult};

/// Registrable label of a domain: "https://www.acme.com/x" -> "acme"
pub fn brand_token(domain: &str) -> String {
    let mut host = domain.trim().to_lowercase();
    if let Some(rest) = host.split_once("://").map(|(_, rest)| rest) {
        host = rest.to_string();
    }
    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }
    if let Some(end) = host.find(['/', '?', '#']) {
        host.truncate(end);
    }
    host.split('.').next().unwrap_or(&host).to_string()
}

/// Byte offset of the first word-boundary occurrence of `needle` in
/// `haystack`; both must already be lowercase
fn find_bounded(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }

    let bytes = haystack.as_bytes();
    let mut search_from = 0;
    while let Some(relative) = haystack[search_from..].find(needle) {
        let start = search_from + relative;
        let end = start + needle.len();

        let boundary_before = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let boundary_after = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if boundary_before && boundary_after {
            return Some(start);
        }

        // Match end is always a char boundary; start + 1 need not be
        search_from = end;
    }
    None
}

/// Offset of the first mention of `domain` in lowercased answer text,
/// matching either the brand token or the full domain
fn mention_offset(text_lower: &str, domain: &str) -> Option<usize> {
    let token = brand_token(domain);
    let token_at = find_bounded(text_lower, &token);
    let domain_at = find_bounded(text_lower, &domain.to_lowercase());

    match (token_at, domain_at) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Whether a citation URL belongs to `domain`
fn url_belongs_to(url: &str, domain: &str) -> bool {
    let url = url.to_lowercase();
    let domain = domain.to_lowercase();

    let host = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&url);
    let host = host.split(['/', '?', '#']).next().unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host);

    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Scan one engine answer into a raw check result
///
/// Competitor domains are deduplicated (first occurrence wins) so the
/// mention list is unique within the check, per the data model.
pub fn scan_answer(
    provider: Provider,
    answer: &EngineAnswer,
    ctx: &QueryContext,
) -> RawCheckResult {
    let text_lower = answer.text.to_lowercase();

    let brand_offset = mention_offset(&text_lower, &ctx.target_domain);
    let brand_mentioned = brand_offset.is_some();

    // First citation URL belonging to the brand
    let citation = answer
        .citations
        .iter()
        .enumerate()
        .find(|(_, url)| url_belongs_to(url, &ctx.target_domain));
    let (citation_position, cited_url) = match citation {
        Some((index, url)) => (Some(index as u32 + 1), Some(url.clone())),
        None => (None, None),
    };

    // Unique competitor domains, project order preserved
    let mut seen = Vec::new();
    let mut competitor_offsets = Vec::new();
    for domain in &ctx.competitor_domains {
        let normalized = domain.to_lowercase();
        if seen.contains(&normalized) {
            continue;
        }
        seen.push(normalized.clone());
        competitor_offsets.push((normalized.clone(), mention_offset(&text_lower, &normalized)));
    }

    // Rank all mentioned domains (brand included) by first occurrence
    let mut ranked: Vec<usize> = competitor_offsets
        .iter()
        .filter_map(|(_, offset)| *offset)
        .chain(brand_offset)
        .collect();
    ranked.sort_unstable();
    ranked.dedup();

    let competitor_mentions = competitor_offsets
        .into_iter()
        .map(|(domain, offset)| CompetitorMention {
            mentioned: offset.is_some(),
            position: offset.map(|o| {
                ranked.iter().position(|&r| r == o).map(|i| i as u32 + 1).unwrap_or(0)
            }),
            domain,
        })
        .collect();

    RawCheckResult {
        provider,
        response_text: Some(answer.text.clone()),
        brand_mentioned,
        url_cited: cited_url.is_some(),
        cited_url,
        citation_position,
        competitor_mentions,
    }
}
