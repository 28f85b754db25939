//! Configuration surface for the scoring models and the quality gate enforcer.
//!
//! Both configs deserialize from JSON, have production defaults, and can be
//! overridden from the environment through an explicit `from_env()` call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{ScoringError, ScoringResult};
use crate::scoring::curves::VolumeMethod;

// Scoring defaults
pub const DEFAULT_TARGET_POSITION: u32 = 3;
pub const DEFAULT_TOPICAL_ALIGNMENT: f64 = 0.5;
pub const DEFAULT_QUICK_WIN_MIN_SCORE: u32 = 70;
pub const DEFAULT_QUICK_WIN_MAX_DIFFICULTY: u32 = 30;

// Quality gate defaults
pub const MINIMUM_QUALITY_SCORE: f64 = 8.0;
pub const STRICT_MINIMUM_QUALITY_SCORE: f64 = 9.0;
pub const MAX_QUALITY_SCORE: f64 = 10.0;

pub const ENV_TARGET_POSITION: &str = "SEOSCORE_TARGET_POSITION";
pub const ENV_DEFAULT_TOPICAL_ALIGNMENT: &str = "SEOSCORE_DEFAULT_TOPICAL_ALIGNMENT";
pub const ENV_MIN_QUALITY_SCORE: &str = "SEOSCORE_MIN_QUALITY_SCORE";

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {name}={raw:?}");
            None
        }
    }
}

/// Share of lost traffic expected to come back after an update, by decay band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryBands {
    /// Decay score above 0.5.
    pub severe_rate: f64,
    /// Decay score in 0.3..=0.5.
    pub moderate_rate: f64,
    /// Decay score below 0.3.
    pub light_rate: f64,
}

impl Default for RecoveryBands {
    fn default() -> Self {
        Self {
            severe_rate: 0.5,
            moderate_rate: 0.7,
            light_rate: 0.9,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub target_position: u32,
    pub default_topical_alignment: f64,
    pub volume_method: VolumeMethod,
    pub recovery_bands: RecoveryBands,
    pub quick_win_min_score: u32,
    pub quick_win_max_difficulty: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_position: DEFAULT_TARGET_POSITION,
            default_topical_alignment: DEFAULT_TOPICAL_ALIGNMENT,
            volume_method: VolumeMethod::Logarithmic,
            recovery_bands: RecoveryBands::default(),
            quick_win_min_score: DEFAULT_QUICK_WIN_MIN_SCORE,
            quick_win_max_difficulty: DEFAULT_QUICK_WIN_MAX_DIFFICULTY,
        }
    }
}

impl ScoringConfig {
    /// Defaults with `SEOSCORE_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(position) = env_parse::<u32>(ENV_TARGET_POSITION) {
            config.target_position = position;
        }
        if let Some(alignment) = env_parse::<f64>(ENV_DEFAULT_TOPICAL_ALIGNMENT) {
            config.default_topical_alignment = alignment;
        }
        config
    }

    pub fn validate(&self) -> ScoringResult<()> {
        if self.target_position == 0 {
            return Err(ScoringError::Config(
                "target_position must be a positive rank".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_topical_alignment) {
            return Err(ScoringError::Config(format!(
                "default_topical_alignment must be within 0..=1, got {}",
                self.default_topical_alignment
            )));
        }
        let bands = &self.recovery_bands;
        for (name, rate) in [
            ("severe_rate", bands.severe_rate),
            ("moderate_rate", bands.moderate_rate),
            ("light_rate", bands.light_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ScoringError::Config(format!(
                    "recovery_bands.{name} must be within 0..=1, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Per-gate adjustments applied on top of the default gate set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateOverride {
    pub threshold: Option<f64>,
    pub weight: Option<f64>,
    pub required: Option<bool>,
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Composite score (0–10) a report must reach to ship.
    pub minimum_quality_score: f64,
    pub gate_overrides: BTreeMap<String, GateOverride>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            minimum_quality_score: MINIMUM_QUALITY_SCORE,
            gate_overrides: BTreeMap::new(),
        }
    }
}

impl QualityConfig {
    /// Enterprise-tier preset: higher bar and every default gate required.
    pub fn strict() -> Self {
        let gate_overrides = crate::quality::checks::DEFAULT_GATE_NAMES
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    GateOverride {
                        required: Some(true),
                        ..Default::default()
                    },
                )
            })
            .collect();
        Self {
            minimum_quality_score: STRICT_MINIMUM_QUALITY_SCORE,
            gate_overrides,
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(minimum) = env_parse::<f64>(ENV_MIN_QUALITY_SCORE) {
            config.minimum_quality_score = minimum;
        }
        config
    }

    pub fn validate(&self) -> ScoringResult<()> {
        validate_minimum_score(self.minimum_quality_score)?;
        for (name, gate) in &self.gate_overrides {
            if let Some(threshold) = gate.threshold {
                validate_threshold(name, threshold)?;
            }
            if let Some(weight) = gate.weight {
                validate_weight(name, weight)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_minimum_score(minimum: f64) -> ScoringResult<()> {
    if !(0.0..=MAX_QUALITY_SCORE).contains(&minimum) {
        return Err(ScoringError::Config(format!(
            "minimum_quality_score must be within 0..=10, got {minimum}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_threshold(gate: &str, threshold: f64) -> ScoringResult<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ScoringError::Config(format!(
            "gate {gate}: threshold must be within 0..=1, got {threshold}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_weight(gate: &str, weight: f64) -> ScoringResult<()> {
    if !(weight.is_finite() && weight > 0.0) {
        return Err(ScoringError::Config(format!(
            "gate {gate}: weight must be positive, got {weight}"
        )));
    }
    Ok(())
}
