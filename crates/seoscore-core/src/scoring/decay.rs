//! Content decay detection and Keep / Update / Consolidate / Kill triage.
//!
//! A page's decay score is a weighted blend of how far traffic, position and
//! CTR have fallen from their historical peaks, plus how long ago the page was
//! last updated. Without history there is no baseline, so only the age term
//! can contribute.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{RecoveryBands, ScoringConfig};
use crate::errors::{ScoringError, ScoringResult};
use crate::models::{ContentAction, ContentPerformance, DecayAnalysis, DecayComponents};
use crate::scoring::batch::{distribution, score_isolated, sort_descending_by, top_n, BatchOutcome};
use crate::scoring::curves::{clamp, classify_decay, mean, percentile, round_to};

pub const TRAFFIC_WEIGHT: f64 = 0.40;
pub const POSITION_WEIGHT: f64 = 0.30;
pub const CTR_WEIGHT: f64 = 0.20;
pub const AGE_WEIGHT: f64 = 0.10;

/// Assumed age when a page has no recorded update date.
pub const DEFAULT_MONTHS_SINCE_UPDATE: f64 = 12.0;
pub const AGE_HORIZON_MONTHS: f64 = 24.0;
pub const POSITION_DECAY_SPAN: f64 = 10.0;
pub const MIN_PEAK_CTR: f64 = 0.01;
pub const DAYS_PER_MONTH: f64 = 30.44;

// Action rule thresholds, evaluated in order: keep, kill, consolidate, update.
const KEEP_MAX_SCORE: f64 = 0.1;
const KILL_MIN_SCORE: f64 = 0.5;
const KILL_MAX_TRAFFIC: f64 = 50.0;
const KILL_MIN_MONTHS: f64 = 18.0;
const CONSOLIDATE_MIN_SCORE: f64 = 0.4;
const CONSOLIDATE_MAX_TRAFFIC: f64 = 100.0;
const CONSOLIDATE_MAX_PEAK: f64 = 500.0;

const SEVERE_RECOVERY_MIN_SCORE: f64 = 0.5;
const MODERATE_RECOVERY_MIN_SCORE: f64 = 0.3;

/// Current-versus-peak measurements a decay score is computed from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecaySignals {
    pub current_traffic: f64,
    pub peak_traffic: f64,
    pub current_position: Option<f64>,
    pub peak_position: Option<f64>,
    pub current_ctr: f64,
    pub peak_ctr: f64,
    pub months_since_update: f64,
}

fn finite_metric(url: &str, name: &str, value: f64) -> ScoringResult<f64> {
    if !value.is_finite() {
        return Err(ScoringError::invalid(url, format!("{name} is not a number: {value}")));
    }
    Ok(value.max(0.0))
}

fn finite_position(url: &str, value: Option<f64>) -> ScoringResult<Option<f64>> {
    match value {
        Some(p) if !p.is_finite() => Err(ScoringError::invalid(
            url,
            format!("position is not a number: {p}"),
        )),
        Some(p) if p > 0.0 => Ok(Some(p)),
        _ => Ok(None),
    }
}

/// Whole-and-fractional months between `last_updated` and `as_of`.
pub fn months_since(last_updated: Option<NaiveDate>, as_of: NaiveDate) -> f64 {
    match last_updated {
        Some(date) => ((as_of - date).num_days() as f64 / DAYS_PER_MONTH).max(0.0),
        None => DEFAULT_MONTHS_SINCE_UPDATE,
    }
}

impl DecaySignals {
    /// Derive peaks from the page history. Empty history means peak = current.
    pub fn from_page(page: &ContentPerformance, as_of: NaiveDate) -> ScoringResult<Self> {
        let url = page.url.as_str();
        if url.trim().is_empty() {
            return Err(ScoringError::invalid("", "url is empty"));
        }
        let current_traffic = finite_metric(url, "current_traffic", page.current_traffic)?;
        let current_ctr = finite_metric(url, "current_ctr", page.current_ctr)?;
        let current_position = finite_position(url, page.current_position)?;
        let months_since_update = months_since(page.last_updated, as_of);

        if page.history.is_empty() {
            return Ok(Self {
                current_traffic,
                peak_traffic: current_traffic,
                current_position,
                peak_position: current_position,
                current_ctr,
                peak_ctr: current_ctr,
                months_since_update,
            });
        }

        let mut peak_traffic = current_traffic;
        let mut peak_ctr = current_ctr;
        let mut peak_position: Option<f64> = None;
        for snapshot in &page.history {
            peak_traffic = peak_traffic.max(finite_metric(url, "history.traffic", snapshot.traffic)?);
            peak_ctr = peak_ctr.max(finite_metric(url, "history.ctr", snapshot.ctr)?);
            if let Some(position) = finite_position(url, snapshot.position)? {
                peak_position = Some(peak_position.map_or(position, |best| best.min(position)));
            }
        }

        Ok(Self {
            current_traffic,
            peak_traffic,
            current_position,
            peak_position,
            current_ctr,
            peak_ctr,
            months_since_update,
        })
    }

    pub fn lost_traffic(&self) -> f64 {
        (self.peak_traffic - self.current_traffic).max(0.0)
    }
}

pub fn decay_components(signals: &DecaySignals) -> DecayComponents {
    let traffic = if signals.peak_traffic > 0.0 {
        clamp(signals.lost_traffic() / signals.peak_traffic, 0.0, 1.0)
    } else {
        0.0
    };

    let position = match (signals.current_position, signals.peak_position) {
        (Some(current), Some(peak)) => clamp((current - peak) / POSITION_DECAY_SPAN, 0.0, 1.0),
        _ => 0.0,
    };

    let ctr = clamp(
        (signals.peak_ctr - signals.current_ctr) / signals.peak_ctr.max(MIN_PEAK_CTR),
        0.0,
        1.0,
    );

    let age = clamp(signals.months_since_update / AGE_HORIZON_MONTHS, 0.0, 1.0);

    DecayComponents {
        traffic,
        position,
        ctr,
        age,
    }
}

pub fn combine_components(components: &DecayComponents) -> f64 {
    TRAFFIC_WEIGHT * components.traffic
        + POSITION_WEIGHT * components.position
        + CTR_WEIGHT * components.ctr
        + AGE_WEIGHT * components.age
}

/// Ordered rules: the first match wins, overlapping conditions included.
pub fn recommend_action(
    decay_score: f64,
    current_traffic: f64,
    peak_traffic: f64,
    months_since_update: f64,
) -> ContentAction {
    if decay_score < KEEP_MAX_SCORE {
        ContentAction::Keep
    } else if decay_score > KILL_MIN_SCORE
        && current_traffic < KILL_MAX_TRAFFIC
        && months_since_update > KILL_MIN_MONTHS
    {
        ContentAction::Kill
    } else if decay_score > CONSOLIDATE_MIN_SCORE
        && current_traffic < CONSOLIDATE_MAX_TRAFFIC
        && peak_traffic < CONSOLIDATE_MAX_PEAK
    {
        ContentAction::Consolidate
    } else {
        ContentAction::Update
    }
}

pub fn recovery_rate(decay_score: f64, bands: &RecoveryBands) -> f64 {
    if decay_score > SEVERE_RECOVERY_MIN_SCORE {
        bands.severe_rate
    } else if decay_score >= MODERATE_RECOVERY_MIN_SCORE {
        bands.moderate_rate
    } else {
        bands.light_rate
    }
}

pub fn analyze_signals(url: &str, signals: &DecaySignals, bands: &RecoveryBands) -> DecayAnalysis {
    let components = decay_components(signals);
    let decay_score = clamp(combine_components(&components), 0.0, 1.0);
    let lost_traffic = signals.lost_traffic();
    let rate = recovery_rate(decay_score, bands);

    DecayAnalysis {
        url: url.to_string(),
        current_traffic: signals.current_traffic,
        peak_traffic: signals.peak_traffic,
        current_position: signals.current_position,
        peak_position: signals.peak_position,
        months_since_update: signals.months_since_update,
        components,
        decay_score,
        severity: classify_decay(decay_score),
        action: recommend_action(
            decay_score,
            signals.current_traffic,
            signals.peak_traffic,
            signals.months_since_update,
        ),
        lost_traffic,
        recovery_rate: rate,
        recoverable_traffic: lost_traffic * rate,
    }
}

/// Score one page as of `as_of` (the reference date for update age).
pub fn calculate_decay_score(
    page: &ContentPerformance,
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> ScoringResult<DecayAnalysis> {
    let signals = DecaySignals::from_page(page, as_of)?;
    Ok(analyze_signals(&page.url, &signals, &config.recovery_bands))
}

// ---------------------------------------------------------------------------
// Batch & ranking
// ---------------------------------------------------------------------------

/// Score a set of pages; most decayed first, input order breaking ties.
pub fn calculate_batch_decay(
    pages: &[ContentPerformance],
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> BatchOutcome<DecayAnalysis> {
    let mut outcome = score_isolated(
        pages,
        |page| page.url.as_str(),
        |page| calculate_decay_score(page, as_of, config),
    );
    sort_descending_by(&mut outcome.results, |r| r.decay_score);
    outcome
}

pub fn get_critical_pages(results: &[DecayAnalysis], min_score: f64) -> Vec<DecayAnalysis> {
    let mut critical: Vec<DecayAnalysis> = results
        .iter()
        .filter(|r| r.decay_score >= min_score)
        .cloned()
        .collect();
    sort_descending_by(&mut critical, |r| r.decay_score);
    critical
}

/// Pages marked `update`, largest recoverable traffic first.
pub fn prioritize_updates(results: &[DecayAnalysis]) -> Vec<DecayAnalysis> {
    let mut updates: Vec<DecayAnalysis> = results
        .iter()
        .filter(|r| r.action == ContentAction::Update)
        .cloned()
        .collect();
    sort_descending_by(&mut updates, |r| r.recoverable_traffic);
    updates
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecaySummary {
    pub total_pages: usize,
    pub avg_decay_score: f64,
    pub p90_decay_score: f64,
    pub severity_distribution: BTreeMap<String, usize>,
    pub action_distribution: BTreeMap<String, usize>,
    pub total_lost_traffic: f64,
    pub total_recoverable_traffic: f64,
    pub top_decaying: Vec<DecayAnalysis>,
}

/// `top_decaying` is ranked by decay score whatever order `results` arrives in.
pub fn summarize_decay(results: &[DecayAnalysis], top: usize) -> DecaySummary {
    let scores: Vec<f64> = results.iter().map(|r| r.decay_score).collect();
    let mut ranked = results.to_vec();
    sort_descending_by(&mut ranked, |r| r.decay_score);
    DecaySummary {
        total_pages: results.len(),
        avg_decay_score: round_to(mean(&scores), 4),
        p90_decay_score: round_to(percentile(&scores, 90.0).unwrap_or(0.0), 4),
        severity_distribution: distribution(results.iter().map(|r| r.severity.as_str())),
        action_distribution: distribution(results.iter().map(|r| r.action.as_str())),
        total_lost_traffic: round_to(results.iter().map(|r| r.lost_traffic).sum(), 2),
        total_recoverable_traffic: round_to(
            results.iter().map(|r| r.recoverable_traffic).sum(),
            2,
        ),
        top_decaying: top_n(&ranked, top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecaySeverity, HistoricalSnapshot};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
    }

    fn days_before(days: i64) -> NaiveDate {
        as_of() - chrono::Duration::days(days)
    }

    fn snapshot(days_ago: i64, traffic: f64, position: Option<f64>, ctr: f64) -> HistoricalSnapshot {
        HistoricalSnapshot {
            date: days_before(days_ago),
            traffic,
            position,
            ctr,
        }
    }

    #[test]
    fn test_kill_scenario_from_signals() {
        let signals = DecaySignals {
            current_traffic: 10.0,
            peak_traffic: 1000.0,
            current_position: Some(40.0),
            peak_position: Some(5.0),
            current_ctr: 0.02,
            peak_ctr: 0.02,
            months_since_update: 20.0,
        };
        let result = analyze_signals("/old-post", &signals, &RecoveryBands::default());
        assert!((result.components.traffic - 0.99).abs() < 1e-9);
        assert_eq!(result.components.position, 1.0);
        assert!((result.components.age - 20.0 / 24.0).abs() < 1e-9);
        assert!((result.decay_score - 0.778).abs() < 0.005, "{}", result.decay_score);
        assert_eq!(result.severity, DecaySeverity::Critical);
        assert_eq!(result.action, ContentAction::Kill);
        assert_eq!(result.recovery_rate, 0.5);
        assert!((result.recoverable_traffic - 495.0).abs() < 1e-9);
    }

    #[test]
    fn test_kill_scenario_from_page_history() {
        let page = ContentPerformance {
            url: "https://example.com/old-post".to_string(),
            current_traffic: 10.0,
            current_position: Some(40.0),
            current_ctr: 0.01,
            last_updated: Some(days_before(609)),
            history: vec![
                snapshot(400, 1000.0, Some(5.0), 0.01),
                snapshot(200, 300.0, Some(12.0), 0.01),
            ],
        };
        let result = calculate_decay_score(&page, as_of(), &ScoringConfig::default()).unwrap();
        assert_eq!(result.peak_traffic, 1000.0);
        assert_eq!(result.peak_position, Some(5.0));
        assert!(result.months_since_update > 18.0);
        assert_eq!(result.action, ContentAction::Kill);
    }

    #[test]
    fn test_empty_history_reduces_to_age_only() {
        let mut page = ContentPerformance::new("/fresh", 400.0);
        page.current_position = Some(7.0);
        page.current_ctr = 0.05;
        page.last_updated = Some(days_before(365));

        let result = calculate_decay_score(&page, as_of(), &ScoringConfig::default()).unwrap();
        assert_eq!(result.components.traffic, 0.0);
        assert_eq!(result.components.position, 0.0);
        assert_eq!(result.components.ctr, 0.0);
        assert!((result.decay_score - AGE_WEIGHT * result.components.age).abs() < 1e-12);
        assert_eq!(result.action, ContentAction::Keep);
    }

    #[test]
    fn test_missing_update_date_assumes_twelve_months() {
        let page = ContentPerformance::new("/undated", 100.0);
        let result = calculate_decay_score(&page, as_of(), &ScoringConfig::default()).unwrap();
        assert_eq!(result.months_since_update, DEFAULT_MONTHS_SINCE_UPDATE);
        assert!((result.components.age - 0.5).abs() < 1e-12);
        assert!((result.decay_score - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_ctr_decay_guarded_at_low_peak() {
        let signals = DecaySignals {
            current_traffic: 0.0,
            peak_traffic: 0.0,
            current_position: None,
            peak_position: None,
            current_ctr: 0.0,
            peak_ctr: 0.004,
            months_since_update: 0.0,
        };
        let components = decay_components(&signals);
        assert!((components.ctr - 0.4).abs() < 1e-12);
        assert_eq!(components.traffic, 0.0);
        assert_eq!(components.position, 0.0);
    }

    #[test]
    fn test_action_rule_precedence() {
        assert_eq!(recommend_action(0.09, 0.0, 0.0, 100.0), ContentAction::Keep);
        // Both kill and consolidate conditions hold; kill is checked first.
        assert_eq!(recommend_action(0.6, 20.0, 300.0, 24.0), ContentAction::Kill);
        assert_eq!(recommend_action(0.6, 20.0, 300.0, 12.0), ContentAction::Consolidate);
        assert_eq!(recommend_action(0.45, 80.0, 499.0, 30.0), ContentAction::Consolidate);
        assert_eq!(recommend_action(0.45, 80.0, 500.0, 30.0), ContentAction::Update);
        assert_eq!(recommend_action(0.5, 10.0, 5000.0, 30.0), ContentAction::Update);
    }

    #[test]
    fn test_recovery_bands() {
        let bands = RecoveryBands::default();
        assert_eq!(recovery_rate(0.51, &bands), 0.5);
        assert_eq!(recovery_rate(0.5, &bands), 0.7);
        assert_eq!(recovery_rate(0.3, &bands), 0.7);
        assert_eq!(recovery_rate(0.29, &bands), 0.9);
    }

    #[test]
    fn test_invalid_pages_rejected() {
        let config = ScoringConfig::default();
        assert!(calculate_decay_score(&ContentPerformance::new(" ", 1.0), as_of(), &config).is_err());
        assert!(
            calculate_decay_score(&ContentPerformance::new("/nan", f64::NAN), as_of(), &config)
                .is_err()
        );
        let negative = ContentPerformance::new("/neg", -5.0);
        let result = calculate_decay_score(&negative, as_of(), &config).unwrap();
        assert_eq!(result.current_traffic, 0.0);
    }

    #[test]
    fn test_batch_ranking_and_summary() {
        let mut decayed = ContentPerformance::new("/decayed", 100.0);
        decayed.history = vec![snapshot(300, 1000.0, None, 0.0)];
        decayed.last_updated = Some(days_before(60));

        let mut stable = ContentPerformance::new("/stable", 500.0);
        stable.last_updated = Some(days_before(30));

        let broken = ContentPerformance::new("", 10.0);

        let outcome = calculate_batch_decay(
            &[stable, broken, decayed],
            as_of(),
            &ScoringConfig::default(),
        );
        assert_eq!(outcome.skipped(), 1);
        assert_eq!(outcome.results[0].url, "/decayed");
        assert_eq!(outcome.results[0].action, ContentAction::Update);

        let critical = get_critical_pages(&outcome.results, 0.3);
        assert_eq!(critical.len(), 1);

        let updates = prioritize_updates(&outcome.results);
        assert_eq!(updates.len(), 1);
        assert!((updates[0].recoverable_traffic - 900.0 * 0.7).abs() < 1e-9);

        let summary = summarize_decay(&outcome.results, 1);
        assert_eq!(summary.total_pages, 2);
        assert_eq!(summary.top_decaying.len(), 1);
        assert_eq!(summary.action_distribution["keep"], 1);
        assert_eq!(summary.total_lost_traffic, 900.0);
    }

    #[test]
    fn test_summary_ranks_top_by_decay_for_any_input_order() {
        let mut decayed = ContentPerformance::new("/decayed", 100.0);
        decayed.history = vec![snapshot(300, 1000.0, None, 0.0)];
        decayed.last_updated = Some(days_before(60));

        let mut stable = ContentPerformance::new("/stable", 500.0);
        stable.last_updated = Some(days_before(30));

        let mut slipping = ContentPerformance::new("/slipping", 400.0);
        slipping.history = vec![snapshot(200, 600.0, None, 0.0)];
        slipping.last_updated = Some(days_before(60));

        let mut results =
            calculate_batch_decay(&[stable, decayed, slipping], as_of(), &ScoringConfig::default())
                .results;
        results.reverse();
        assert_eq!(results[0].url, "/stable");

        let summary = summarize_decay(&results, 1);
        assert_eq!(summary.top_decaying.len(), 1);
        assert_eq!(summary.top_decaying[0].url, "/decayed");

        let summary = summarize_decay(&results, 3);
        let scores: Vec<f64> = summary.top_decaying.iter().map(|r| r.decay_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "scores {scores:?}");
    }
}
