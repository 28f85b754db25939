//! Domain-relative ("personalized") keyword difficulty.
//!
//! The base difficulty reported by the metrics provider assumes an average
//! site. Here it is discounted by how much stronger the site is than the pages
//! currently ranking (`rank_advantage`) and by how much topical coverage the
//! site already has for the keyword's category (`topical_bonus`).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::{ScoringError, ScoringResult};
use crate::models::{
    AuthorityAdvantage, CompetitiveGap, DifficultyAnalysis, DifficultyTier, DomainProfile,
    KeywordMetrics, SerpContext, TopicalCategory,
};
use crate::scoring::batch::{distribution, score_isolated, BatchOutcome};
use crate::scoring::curves::{clamp, classify_difficulty, mean, round_to};

pub const MAX_RANK_ADVANTAGE: f64 = 0.3;
pub const MAX_TOPICAL_BONUS: f64 = 0.3;
pub const MAX_AUTHORITY_ADVANTAGE: f64 = 0.5;

/// Rank gap (site minus SERP average) at which the site is labelled ahead/behind.
pub const COMPETITIVE_GAP_MARGIN: f64 = 10.0;

/// How a keyword's declared category lined up with the domain's categories.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CategoryMatch<'a> {
    Exact(&'a TopicalCategory),
    Partial(&'a TopicalCategory),
}

impl<'a> CategoryMatch<'a> {
    pub fn category(&self) -> &'a TopicalCategory {
        match self {
            CategoryMatch::Exact(c) | CategoryMatch::Partial(c) => c,
        }
    }
}

/// Exact name/code match first, then a substring match in either direction.
pub fn match_category<'a>(
    keyword_category: Option<&str>,
    categories: &'a [TopicalCategory],
) -> Option<CategoryMatch<'a>> {
    let wanted = keyword_category?.trim().to_lowercase();
    if wanted.is_empty() || categories.is_empty() {
        return None;
    }

    let exact = categories.iter().find(|c| {
        c.name.trim().to_lowercase() == wanted
            || c
                .code
                .as_deref()
                .is_some_and(|code| code.trim().to_lowercase() == wanted)
    });
    if let Some(category) = exact {
        return Some(CategoryMatch::Exact(category));
    }

    let overlaps = |candidate: &str| {
        let candidate = candidate.trim().to_lowercase();
        !candidate.is_empty() && (candidate.contains(&wanted) || wanted.contains(&candidate))
    };
    categories
        .iter()
        .find(|c| overlaps(&c.name) || c.code.as_deref().is_some_and(overlaps))
        .map(CategoryMatch::Partial)
}

/// Average SERP authority implied by a base difficulty when no SERP data exists.
pub fn estimate_serp_rank(base_difficulty: f64) -> f64 {
    clamp(base_difficulty * 0.7 + 20.0, 20.0, 90.0)
}

pub fn competitive_gap(rank_gap: f64) -> CompetitiveGap {
    if rank_gap >= COMPETITIVE_GAP_MARGIN {
        CompetitiveGap::Advantage
    } else if rank_gap <= -COMPETITIVE_GAP_MARGIN {
        CompetitiveGap::Disadvantage
    } else {
        CompetitiveGap::Neutral
    }
}

fn base_months(tier: DifficultyTier) -> f64 {
    match tier {
        DifficultyTier::VeryEasy => 2.0,
        DifficultyTier::Easy => 4.0,
        DifficultyTier::Moderate => 6.0,
        DifficultyTier::Hard => 9.0,
        DifficultyTier::VeryHard => 12.0,
    }
}

/// Months until the page can plausibly reach page one.
pub fn estimate_months_to_rank(personalized_difficulty: u32, rank_gap: f64) -> u32 {
    let tier = classify_difficulty(f64::from(personalized_difficulty));
    let multiplier = 1.0 - clamp(rank_gap, -50.0, 25.0) / 100.0;
    (base_months(tier) * multiplier).round().max(1.0) as u32
}

pub fn calculate_personalized_difficulty(
    keyword: &KeywordMetrics,
    domain: &DomainProfile,
    serp: Option<&SerpContext>,
) -> ScoringResult<DifficultyAnalysis> {
    if keyword.keyword.trim().is_empty() {
        return Err(ScoringError::invalid("", "keyword text is empty"));
    }
    if !keyword.difficulty.is_finite() {
        return Err(ScoringError::invalid(
            &keyword.keyword,
            format!("difficulty is not a number: {}", keyword.difficulty),
        ));
    }

    let base_difficulty = clamp(keyword.difficulty, 0.0, 100.0);
    let site_rank = clamp(domain.domain_rank as f64, 0.0, 100.0);

    let observed_rank = serp
        .and_then(|s| s.avg_domain_rank)
        .filter(|rank| rank.is_finite());
    let (avg_serp_rank, serp_rank_estimated) = match observed_rank {
        Some(rank) => (clamp(rank, 0.0, 100.0), false),
        None => (estimate_serp_rank(base_difficulty), true),
    };

    let rank_gap = site_rank - avg_serp_rank;
    let rank_advantage = clamp(rank_gap / 100.0, -MAX_RANK_ADVANTAGE, MAX_RANK_ADVANTAGE);

    let matched = match_category(keyword.category.as_deref(), &domain.categories);
    let topical_bonus = matched
        .map(|m| m.category().keyword_count as f64 / 100.0 * MAX_TOPICAL_BONUS)
        .map(|bonus| clamp(bonus, 0.0, MAX_TOPICAL_BONUS))
        .unwrap_or(0.0);

    let total = clamp(rank_advantage + topical_bonus, 0.0, MAX_AUTHORITY_ADVANTAGE);
    let personalized_difficulty =
        clamp((base_difficulty * (1.0 - total)).round(), 0.0, 100.0) as u32;

    Ok(DifficultyAnalysis {
        keyword: keyword.keyword.clone(),
        base_difficulty,
        personalized_difficulty,
        avg_serp_rank,
        serp_rank_estimated,
        rank_gap,
        authority_advantage: AuthorityAdvantage {
            rank_advantage,
            topical_bonus,
            total,
        },
        matched_category: matched.map(|m| m.category().name.clone()),
        tier: classify_difficulty(f64::from(personalized_difficulty)),
        months_to_rank: estimate_months_to_rank(personalized_difficulty, rank_gap),
        competitive_gap: competitive_gap(rank_gap),
    })
}

// ---------------------------------------------------------------------------
// Batch & ranking
// ---------------------------------------------------------------------------

/// Score a keyword set against one domain. Output keeps input order.
pub fn calculate_batch_difficulty(
    keywords: &[KeywordMetrics],
    domain: &DomainProfile,
    serp_by_keyword: &HashMap<String, SerpContext>,
) -> BatchOutcome<DifficultyAnalysis> {
    score_isolated(
        keywords,
        |kw| kw.keyword.as_str(),
        |kw| calculate_personalized_difficulty(kw, domain, serp_by_keyword.get(&kw.keyword)),
    )
}

/// Keywords at or below `max_difficulty`, easiest first.
pub fn find_easy_wins(results: &[DifficultyAnalysis], max_difficulty: u32) -> Vec<DifficultyAnalysis> {
    let mut easy: Vec<DifficultyAnalysis> = results
        .iter()
        .filter(|r| r.personalized_difficulty <= max_difficulty)
        .cloned()
        .collect();
    easy.sort_by_key(|r| r.personalized_difficulty);
    easy
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultySummary {
    pub total_keywords: usize,
    pub avg_base_difficulty: f64,
    pub avg_personalized_difficulty: f64,
    pub avg_reduction: f64,
    pub tier_distribution: BTreeMap<String, usize>,
    pub gap_distribution: BTreeMap<String, usize>,
}

pub fn summarize_difficulty(results: &[DifficultyAnalysis]) -> DifficultySummary {
    let base: Vec<f64> = results.iter().map(|r| r.base_difficulty).collect();
    let personalized: Vec<f64> = results
        .iter()
        .map(|r| f64::from(r.personalized_difficulty))
        .collect();
    let reduction: Vec<f64> = results.iter().map(DifficultyAnalysis::reduction).collect();

    DifficultySummary {
        total_keywords: results.len(),
        avg_base_difficulty: round_to(mean(&base), 2),
        avg_personalized_difficulty: round_to(mean(&personalized), 2),
        avg_reduction: round_to(mean(&reduction), 2),
        tier_distribution: distribution(results.iter().map(|r| r.tier.as_str())),
        gap_distribution: distribution(results.iter().map(|r| r.competitive_gap.as_str())),
    }
}
