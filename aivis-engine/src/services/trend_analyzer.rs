//! Week-over-week trend computation
//!
//! Splits observations into two adjacent half-open 7-day windows and
//! reports the composite score for each plus the delta between them. Each
//! window is reduced through the score engine from scratch; nothing is
//! cached between reads.
//!
//! The audience figures are rough heuristics built on assumed constants,
//! not measured quantities; callers should present them as estimates.

use crate::models::VisibilityCheck;
use crate::services::score_engine::{compute_score_inputs, ScoreInputs, ScoreModel, VisibilityScore};
use crate::types::Provider;
use aivis_common::time::iso_week_label;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Assumed average monthly search volume per tracked query
pub const ASSUMED_MONTHLY_SEARCHES_PER_QUERY: f64 = 1_000.0;

/// Assumed fraction of searchers who consult an AI answer engine
pub const ASSUMED_AI_ADOPTION_RATE: f64 = 0.30;

/// Direction of a week-over-week score movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            TrendDirection::Up
        } else if delta < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

/// One window's reduction: ISO week label, inputs, score, check count
#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    /// ISO-8601 week label of the window start, e.g. "2026-W32"
    pub period: String,
    pub inputs: ScoreInputs,
    pub score: VisibilityScore,
    pub checks: usize,
}

/// Week-over-week trend report
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub current: WindowSummary,
    /// None when the previous window holds no checks; no comparison is
    /// attempted in that case
    pub previous: Option<WindowSummary>,
    pub delta: f64,
    pub direction: TrendDirection,
    /// Estimated monthly AI-answer audience reached in the current window
    pub audience_current: f64,
    /// Percent change vs the previous-window estimate, 0 when that
    /// estimate is 0
    pub audience_growth: f64,
}

/// Per-provider week-over-week mention-rate movement
#[derive(Debug, Clone, Serialize)]
pub struct ProviderTrend {
    pub provider: Provider,
    pub current_rate: f64,
    pub previous_rate: f64,
    pub delta: f64,
    pub direction: TrendDirection,
}

fn in_window(check: &VisibilityCheck, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    check.checked_at >= start && check.checked_at < end
}

/// Estimated monthly AI-answer audience for a window's checks
///
/// Distinct queries with a brand mention, times the assumed per-query
/// search volume and AI-adoption fraction.
fn audience_estimate(window: &[&VisibilityCheck]) -> f64 {
    let mentioned_queries: HashSet<&str> = window
        .iter()
        .filter(|c| c.brand_mentioned)
        .map(|c| c.query.as_str())
        .collect();

    mentioned_queries.len() as f64 * ASSUMED_MONTHLY_SEARCHES_PER_QUERY * ASSUMED_AI_ADOPTION_RATE
}

/// Compute the week-over-week trend report
///
/// `backlink_authority` comes from the current backlink snapshot and is
/// reused for both windows; the signal is not historized.
pub fn compute_trend(
    checks: &[VisibilityCheck],
    now: DateTime<Utc>,
    backlink_authority: f64,
    model: &dyn ScoreModel,
) -> TrendReport {
    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);

    let current: Vec<&VisibilityCheck> =
        checks.iter().filter(|c| in_window(c, week_ago, now)).collect();
    let previous: Vec<&VisibilityCheck> = checks
        .iter()
        .filter(|c| in_window(c, two_weeks_ago, week_ago))
        .collect();

    let summarize = |window: &[&VisibilityCheck], start: DateTime<Utc>| {
        let owned: Vec<VisibilityCheck> = window.iter().map(|c| (*c).clone()).collect();
        let inputs = compute_score_inputs(&owned, backlink_authority);
        WindowSummary {
            period: iso_week_label(start),
            inputs,
            score: model.score(&inputs),
            checks: window.len(),
        }
    };

    let current_summary = summarize(&current, week_ago);
    let audience_current = audience_estimate(&current);

    if previous.is_empty() {
        return TrendReport {
            current: current_summary,
            previous: None,
            delta: 0.0,
            direction: TrendDirection::Stable,
            audience_current,
            audience_growth: 0.0,
        };
    }

    let previous_summary = summarize(&previous, two_weeks_ago);
    let delta = current_summary.score.overall - previous_summary.score.overall;
    let direction = TrendDirection::from_delta(delta);

    let audience_previous = audience_estimate(&previous);
    let audience_growth = if audience_previous == 0.0 {
        0.0
    } else {
        (audience_current - audience_previous) / audience_previous * 100.0
    };

    TrendReport {
        current: current_summary,
        previous: Some(previous_summary),
        delta,
        direction,
        audience_current,
        audience_growth,
    }
}

/// Per-provider week-over-week mention-rate deltas
///
/// Computed independently per provider over the same half-open windows as
/// `compute_trend`. Providers with no checks in either window are
/// omitted.
pub fn provider_mention_deltas(checks: &[VisibilityCheck], now: DateTime<Utc>) -> Vec<ProviderTrend> {
    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);

    let rate = |provider: Provider, start: DateTime<Utc>, end: DateTime<Utc>| {
        let window: Vec<&VisibilityCheck> = checks
            .iter()
            .filter(|c| c.provider == provider && in_window(c, start, end))
            .collect();
        if window.is_empty() {
            return (0.0, 0usize);
        }
        let mentioned = window.iter().filter(|c| c.brand_mentioned).count();
        (mentioned as f64 / window.len() as f64, window.len())
    };

    Provider::ALL
        .into_iter()
        .filter_map(|provider| {
            let (current_rate, current_count) = rate(provider, week_ago, now);
            let (previous_rate, previous_count) = rate(provider, two_weeks_ago, week_ago);
            if current_count == 0 && previous_count == 0 {
                return None;
            }
            let delta = current_rate - previous_rate;
            Some(ProviderTrend {
                provider,
                current_rate,
                previous_rate,
                delta,
                direction: TrendDirection::from_delta(delta),
            })
        })
        .collect()
}
