//! Normalization curves, lookup tables, and classifiers shared by every model.
//!
//! Everything here is a total, stateless function. Classifier bands are
//! inclusive on the lower edge and exclusive on the upper edge.

use serde::{Deserialize, Serialize};

use crate::models::{DecaySeverity, DifficultyTier, SearchIntent};

/// CTR for positions 1 through 10.
const TOP_TEN_CTR: [f64; 10] = [
    0.316, 0.158, 0.110, 0.080, 0.072, 0.051, 0.040, 0.032, 0.028, 0.025,
];
const PAGE_TWO_CTR: f64 = 0.012;
const PAGE_THREE_CTR: f64 = 0.006;
const DEEP_CTR: f64 = 0.003;

/// CTR past position 50, for position 0, and for pages that do not rank.
pub const CTR_FLOOR: f64 = 0.001;

pub const NEUTRAL_INTENT_WEIGHT: f64 = 0.5;

/// Upper bounds (exclusive) of the difficulty tiers below `VeryHard`.
const DIFFICULTY_TIER_BOUNDS: [(f64, DifficultyTier); 4] = [
    (20.0, DifficultyTier::VeryEasy),
    (40.0, DifficultyTier::Easy),
    (60.0, DifficultyTier::Moderate),
    (80.0, DifficultyTier::Hard),
];

/// Upper bounds (exclusive) of the decay severities below `Critical`.
const DECAY_SEVERITY_BOUNDS: [(f64, DecaySeverity); 4] = [
    (0.1, DecaySeverity::None),
    (0.3, DecaySeverity::Light),
    (0.5, DecaySeverity::Moderate),
    (0.7, DecaySeverity::Severe),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeMethod {
    #[default]
    Logarithmic,
    Linear,
    SquareRoot,
}

pub fn clamp(value: f64, minimum: f64, maximum: f64) -> f64 {
    value.max(minimum).min(maximum)
}

/// Normalize a search volume onto 0–100 relative to `max_volume`.
pub fn normalize_volume(volume: f64, max_volume: f64, method: VolumeMethod) -> f64 {
    if volume.is_nan() || volume <= 0.0 {
        return 0.0;
    }
    if volume >= max_volume {
        return 100.0;
    }
    let ratio = match method {
        VolumeMethod::Logarithmic => volume.ln_1p() / max_volume.ln_1p(),
        VolumeMethod::Linear => volume / max_volume,
        VolumeMethod::SquareRoot => volume.sqrt() / max_volume.sqrt(),
    };
    clamp(ratio * 100.0, 0.0, 100.0)
}

/// Expected click-through rate for an organic position.
pub fn get_ctr_for_position(position: Option<u32>) -> f64 {
    match position {
        Some(p @ 1..=10) => TOP_TEN_CTR[(p - 1) as usize],
        Some(11..=20) => PAGE_TWO_CTR,
        Some(21..=30) => PAGE_THREE_CTR,
        Some(31..=50) => DEEP_CTR,
        _ => CTR_FLOOR,
    }
}

pub fn get_intent_weight(intent: SearchIntent) -> f64 {
    match intent {
        SearchIntent::Transactional => 1.0,
        SearchIntent::Commercial => 0.85,
        SearchIntent::Informational => 0.6,
        SearchIntent::Navigational => 0.4,
        SearchIntent::Unknown => NEUTRAL_INTENT_WEIGHT,
    }
}

/// String-keyed variant for callers holding raw collector labels.
pub fn intent_weight_for_label(label: &str) -> f64 {
    get_intent_weight(SearchIntent::parse(label))
}

pub fn classify_difficulty(personalized_difficulty: f64) -> DifficultyTier {
    DIFFICULTY_TIER_BOUNDS
        .iter()
        .find(|(upper, _)| personalized_difficulty < *upper)
        .map(|(_, tier)| *tier)
        .unwrap_or(DifficultyTier::VeryHard)
}

pub fn classify_decay(decay_score: f64) -> DecaySeverity {
    DECAY_SEVERITY_BOUNDS
        .iter()
        .find(|(upper, _)| decay_score < *upper)
        .map(|(_, severity)| *severity)
        .unwrap_or(DecaySeverity::Critical)
}

/// Weighted mean of `(value, weight)` pairs; 0 when the weights sum to 0.
pub fn weighted_average(pairs: &[(f64, f64)]) -> f64 {
    let total_weight: f64 = pairs.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    pairs.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight
}

/// Linear-interpolated percentile (`p` in 0–100). `None` for empty input.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let rank = clamp(p, 0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
