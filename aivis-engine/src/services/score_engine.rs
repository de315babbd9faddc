//! Visibility score input reduction and composite scoring
//!
//! Pure reduction from stored check observations to the four normalized
//! score inputs, plus the replaceable composite model that combines them.
//!
//! Checks are partitioned into two disjoint, exhaustive subsets:
//! - `llm`: conversational assistants (everything except AI-mode search)
//! - `ai`: the AI-mode search provider
//!
//! Every ratio is 0, never NaN or Infinity, when its denominator is 0.

use crate::models::VisibilityCheck;
use serde::Serialize;

/// Referring-domain count at which the authority signal saturates
const AUTHORITY_SATURATION_DOMAINS: f64 = 50.0;

/// The four normalized score inputs, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreInputs {
    /// Share of conversational-assistant checks mentioning the brand
    pub llm_mention_rate: f64,
    /// Share of AI-mode search checks mentioning the brand
    pub ai_search_presence_rate: f64,
    /// Brand mentions / (brand + competitor mentions), llm subset only
    pub share_of_voice: f64,
    /// Saturating backlink authority signal
    pub backlink_authority: f64,
}

/// Composite visibility score with sub-scores, all on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisibilityScore {
    pub overall: f64,
    pub mention: f64,
    pub ai_search: f64,
    pub share_of_voice: f64,
    pub authority: f64,
}

/// Composite scoring capability
///
/// The combination formula is a collaborator, not part of the reduction;
/// swapping the model never changes the four inputs.
pub trait ScoreModel: Send + Sync {
    fn score(&self, inputs: &ScoreInputs) -> VisibilityScore;
}

/// Default weighted composite model
pub struct WeightedScoreModel {
    mention_weight: f64,
    ai_search_weight: f64,
    share_of_voice_weight: f64,
    authority_weight: f64,
}

impl WeightedScoreModel {
    /// Default weights: mention 35%, AI search 25%, share of voice 25%,
    /// authority 15%
    pub fn new() -> Self {
        Self {
            mention_weight: 0.35,
            ai_search_weight: 0.25,
            share_of_voice_weight: 0.25,
            authority_weight: 0.15,
        }
    }
}

impl Default for WeightedScoreModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreModel for WeightedScoreModel {
    fn score(&self, inputs: &ScoreInputs) -> VisibilityScore {
        let overall = (inputs.llm_mention_rate * self.mention_weight
            + inputs.ai_search_presence_rate * self.ai_search_weight
            + inputs.share_of_voice * self.share_of_voice_weight
            + inputs.backlink_authority * self.authority_weight)
            * 100.0;

        VisibilityScore {
            overall,
            mention: inputs.llm_mention_rate * 100.0,
            ai_search: inputs.ai_search_presence_rate * 100.0,
            share_of_voice: inputs.share_of_voice * 100.0,
            authority: inputs.backlink_authority * 100.0,
        }
    }
}

/// Saturating authority signal from a referring-domain count:
/// `min(1, referring_domains / 50)`
pub fn backlink_authority_signal(referring_domains: u64) -> f64 {
    (referring_domains as f64 / AUTHORITY_SATURATION_DOMAINS).min(1.0)
}

/// Reduce a check set to the four score inputs
///
/// `backlink_authority` is sourced from the backlink capability, not from
/// the checks, and is passed through unchanged.
pub fn compute_score_inputs(checks: &[VisibilityCheck], backlink_authority: f64) -> ScoreInputs {
    let llm: Vec<&VisibilityCheck> = checks.iter().filter(|c| !c.provider.is_ai_search()).collect();
    let ai: Vec<&VisibilityCheck> = checks.iter().filter(|c| c.provider.is_ai_search()).collect();

    let llm_mentions = llm.iter().filter(|c| c.brand_mentioned).count();
    let llm_mention_rate = if llm.is_empty() {
        0.0
    } else {
        llm_mentions as f64 / llm.len() as f64
    };

    let ai_mentions = ai.iter().filter(|c| c.brand_mentioned).count();
    let ai_search_presence_rate = if ai.is_empty() {
        0.0
    } else {
        ai_mentions as f64 / ai.len() as f64
    };

    // Competitor mentions are distinct within a check but deliberately not
    // deduplicated across checks: a competitor mentioned in 5 checks
    // counts 5 times.
    let competitor_mentions: usize = llm.iter().map(|c| c.mentioned_competitor_count()).sum();
    let voice_total = llm_mentions + competitor_mentions;
    let share_of_voice = if voice_total == 0 {
        0.0
    } else {
        llm_mentions as f64 / voice_total as f64
    };

    ScoreInputs {
        llm_mention_rate,
        ai_search_presence_rate,
        share_of_voice,
        backlink_authority,
    }
}
