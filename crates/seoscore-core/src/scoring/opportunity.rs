//! Opportunity scoring: blends demand, rankability, intent, position upside,
//! and topical fit into one 0–100 ranking value per keyword.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::errors::ScoringResult;
use crate::models::{
    BusinessEstimate, ComponentScores, DomainProfile, KeywordMetrics, OpportunityAnalysis,
    OpportunityType, SerpContext,
};
use crate::scoring::batch::{distribution, score_isolated, sort_descending_by, top_n, BatchOutcome};
use crate::scoring::curves::{
    clamp, get_ctr_for_position, get_intent_weight, mean, normalize_volume, percentile, round_to,
    CTR_FLOOR,
};
use crate::scoring::difficulty::{calculate_personalized_difficulty, match_category, CategoryMatch};

pub const COMPONENT_WEIGHT: f64 = 0.20;

pub const FRESH_CONTENT_MODIFIER: f64 = 1.1;
pub const STALE_CONTENT_MODIFIER: f64 = 0.95;
pub const FRESH_CONTENT_MAX_AGE_DAYS: f64 = 90.0;
pub const STALE_CONTENT_MIN_AGE_DAYS: f64 = 730.0;
const MIN_FRESHNESS_MODIFIER: f64 = 0.8;
const MAX_FRESHNESS_MODIFIER: f64 = 1.2;

const EXACT_TOPICAL_SCALE: f64 = 2.0;
const EXACT_TOPICAL_CAP: f64 = 100.0;
const PARTIAL_TOPICAL_SCALE: f64 = 1.5;
const PARTIAL_TOPICAL_CAP: f64 = 80.0;

const STRATEGIC_MIN_SCORE: u32 = 50;
const STRATEGIC_MIN_VOLUME_SCORE: f64 = 60.0;
const LONG_TERM_MIN_SCORE: u32 = 40;

/// CTR upside of moving from `current` to `target`, on 0–100.
pub fn position_gap_score(current: Option<u32>, target: u32, search_volume: u64) -> f64 {
    if search_volume == 0 {
        return 0.0;
    }
    let target_ctr = get_ctr_for_position(Some(target));
    let max_gap = target_ctr - CTR_FLOOR;
    if max_gap <= 0.0 {
        return 0.0;
    }
    let ctr_gap = target_ctr - get_ctr_for_position(current);
    clamp(ctr_gap / max_gap * 100.0, 0.0, 100.0)
}

/// Category-coverage score; unknown alignment falls back to `default_alignment`.
pub fn topical_alignment_score(
    keyword: &KeywordMetrics,
    domain: &DomainProfile,
    default_alignment: f64,
) -> f64 {
    match match_category(keyword.category.as_deref(), &domain.categories) {
        Some(CategoryMatch::Exact(c)) => {
            (c.keyword_count as f64 * EXACT_TOPICAL_SCALE).min(EXACT_TOPICAL_CAP)
        }
        Some(CategoryMatch::Partial(c)) => {
            (c.keyword_count as f64 * PARTIAL_TOPICAL_SCALE).min(PARTIAL_TOPICAL_CAP)
        }
        None => clamp(default_alignment, 0.0, 1.0) * 100.0,
    }
}

/// Multiplier for how fresh the ranking content is; 1.0 without SERP data.
pub fn freshness_modifier(serp: Option<&SerpContext>) -> f64 {
    let Some(serp) = serp else {
        return 1.0;
    };
    let age = serp.avg_content_age_days.filter(|a| a.is_finite());
    let modifier = if serp.has_news_results || age.is_some_and(|a| a < FRESH_CONTENT_MAX_AGE_DAYS) {
        FRESH_CONTENT_MODIFIER
    } else if age.is_some_and(|a| a > STALE_CONTENT_MIN_AGE_DAYS) {
        STALE_CONTENT_MODIFIER
    } else {
        1.0
    };
    clamp(modifier, MIN_FRESHNESS_MODIFIER, MAX_FRESHNESS_MODIFIER)
}

pub fn classify_opportunity(
    score: u32,
    current_position: Option<u32>,
    personalized_difficulty: u32,
    volume_score: f64,
    config: &ScoringConfig,
) -> OpportunityType {
    if current_position.is_some_and(|p| p <= config.target_position) {
        OpportunityType::Maintain
    } else if score >= config.quick_win_min_score
        && personalized_difficulty <= config.quick_win_max_difficulty
    {
        OpportunityType::QuickWin
    } else if score >= STRATEGIC_MIN_SCORE && volume_score >= STRATEGIC_MIN_VOLUME_SCORE {
        OpportunityType::Strategic
    } else if score >= LONG_TERM_MIN_SCORE {
        OpportunityType::LongTerm
    } else {
        OpportunityType::LowPriority
    }
}

pub fn calculate_opportunity_score(
    keyword: &KeywordMetrics,
    domain: &DomainProfile,
    max_volume: u64,
    serp: Option<&SerpContext>,
    config: &ScoringConfig,
) -> ScoringResult<OpportunityAnalysis> {
    let difficulty = calculate_personalized_difficulty(keyword, domain, serp)?;
    let current_position = keyword.ranking_position();

    let components = ComponentScores {
        volume: normalize_volume(
            keyword.search_volume as f64,
            max_volume as f64,
            config.volume_method,
        ),
        difficulty: 100.0 - f64::from(difficulty.personalized_difficulty),
        intent: get_intent_weight(keyword.intent) * 100.0,
        position_gap: position_gap_score(
            current_position,
            config.target_position,
            keyword.search_volume,
        ),
        topical: topical_alignment_score(keyword, domain, config.default_topical_alignment),
    };

    let raw = COMPONENT_WEIGHT
        * (components.volume
            + components.difficulty
            + components.intent
            + components.position_gap
            + components.topical);
    let modifier = freshness_modifier(serp);
    let opportunity_score = clamp((raw * modifier).round(), 0.0, 100.0) as u32;

    let target_ctr = get_ctr_for_position(Some(config.target_position));
    let ctr_uplift = (target_ctr - get_ctr_for_position(current_position)).max(0.0);
    let traffic_gain = keyword.search_volume as f64 * ctr_uplift;
    let estimates = BusinessEstimate {
        traffic_gain,
        monthly_value: traffic_gain * keyword.cpc_or_default(),
        months_to_rank: difficulty.months_to_rank,
    };

    let opportunity_type = classify_opportunity(
        opportunity_score,
        current_position,
        difficulty.personalized_difficulty,
        components.volume,
        config,
    );

    Ok(OpportunityAnalysis {
        keyword: keyword.keyword.clone(),
        search_volume: keyword.search_volume,
        current_position,
        intent: keyword.intent,
        difficulty,
        components,
        freshness_modifier: modifier,
        opportunity_score,
        opportunity_type,
        estimates,
    })
}

// ---------------------------------------------------------------------------
// Batch & ranking
// ---------------------------------------------------------------------------

/// Score a keyword set; results are sorted by score, highest first, with
/// input order breaking ties.
pub fn calculate_batch_opportunities(
    keywords: &[KeywordMetrics],
    domain: &DomainProfile,
    serp_by_keyword: &HashMap<String, SerpContext>,
    config: &ScoringConfig,
) -> BatchOutcome<OpportunityAnalysis> {
    let max_volume = keywords
        .iter()
        .map(|kw| kw.search_volume)
        .max()
        .unwrap_or(0)
        .max(1);

    let mut outcome = score_isolated(
        keywords,
        |kw| kw.keyword.as_str(),
        |kw| {
            calculate_opportunity_score(
                kw,
                domain,
                max_volume,
                serp_by_keyword.get(&kw.keyword),
                config,
            )
        },
    );
    sort_descending_by(&mut outcome.results, |r| f64::from(r.opportunity_score));
    outcome
}

/// Quick wins from an already ranked list, best first.
pub fn get_quick_wins(results: &[OpportunityAnalysis], limit: usize) -> Vec<OpportunityAnalysis> {
    results
        .iter()
        .filter(|r| r.opportunity_type == OpportunityType::QuickWin)
        .take(limit)
        .cloned()
        .collect()
}

pub fn filter_by_type(
    results: &[OpportunityAnalysis],
    opportunity_type: OpportunityType,
) -> Vec<OpportunityAnalysis> {
    results
        .iter()
        .filter(|r| r.opportunity_type == opportunity_type)
        .cloned()
        .collect()
}

/// Reorder by monthly value per month-to-rank, highest first.
pub fn prioritize_by_roi(results: &[OpportunityAnalysis]) -> Vec<OpportunityAnalysis> {
    let mut ranked = results.to_vec();
    sort_descending_by(&mut ranked, OpportunityAnalysis::roi);
    ranked
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpportunitySummary {
    pub total_keywords: usize,
    pub avg_score: f64,
    pub median_score: f64,
    pub total_traffic_gain: f64,
    pub total_monthly_value: f64,
    pub quick_wins: usize,
    pub type_distribution: BTreeMap<String, usize>,
    pub tier_distribution: BTreeMap<String, usize>,
    pub top_opportunities: Vec<OpportunityAnalysis>,
}

/// Aggregate view of a batch. `top_opportunities` is ranked by score whatever
/// order `results` arrives in.
pub fn summarize_opportunities(results: &[OpportunityAnalysis], top: usize) -> OpportunitySummary {
    let scores: Vec<f64> = results
        .iter()
        .map(|r| f64::from(r.opportunity_score))
        .collect();
    let mut ranked = results.to_vec();
    sort_descending_by(&mut ranked, |r| f64::from(r.opportunity_score));

    OpportunitySummary {
        total_keywords: results.len(),
        avg_score: round_to(mean(&scores), 2),
        median_score: percentile(&scores, 50.0).unwrap_or(0.0),
        total_traffic_gain: round_to(results.iter().map(|r| r.estimates.traffic_gain).sum(), 2),
        total_monthly_value: round_to(results.iter().map(|r| r.estimates.monthly_value).sum(), 2),
        quick_wins: results
            .iter()
            .filter(|r| r.opportunity_type == OpportunityType::QuickWin)
            .count(),
        type_distribution: distribution(results.iter().map(|r| r.opportunity_type.as_str())),
        tier_distribution: distribution(results.iter().map(|r| r.difficulty.tier.as_str())),
        top_opportunities: top_n(&ranked, top),
    }
}
