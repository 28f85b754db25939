//! Gate registry and composite verdict.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{GateOverride, QualityConfig, MAX_QUALITY_SCORE, MINIMUM_QUALITY_SCORE};
use crate::config::{validate_minimum_score, validate_threshold, validate_weight};
use crate::errors::{ScoringError, ScoringResult};
use crate::quality::checks::default_gates;
use crate::quality::gate::{CheckResult, CheckStatus, CompositeQualityReport, QualityGate};
use crate::scoring::curves::round_to;

static EMPTY_CONTEXT: Value = Value::Null;

#[derive(Debug, Clone)]
pub struct QualityGateEnforcer {
    minimum_score: f64,
    gates: IndexMap<String, QualityGate>,
}

impl Default for QualityGateEnforcer {
    fn default() -> Self {
        Self {
            minimum_score: MINIMUM_QUALITY_SCORE,
            gates: IndexMap::new(),
        }
    }
}

impl QualityGateEnforcer {
    /// An empty registry with the given composite bar (0–10).
    pub fn new(minimum_score: f64) -> ScoringResult<Self> {
        validate_minimum_score(minimum_score)?;
        Ok(Self {
            minimum_score,
            gates: IndexMap::new(),
        })
    }

    /// The default gate set at the standard bar.
    pub fn with_defaults() -> ScoringResult<Self> {
        Self::with_config(&QualityConfig::default())
    }

    /// The default gate set, adjusted by `config`'s bar and per-gate overrides.
    pub fn with_config(config: &QualityConfig) -> ScoringResult<Self> {
        config.validate()?;
        let mut enforcer = Self::new(config.minimum_quality_score)?;
        enforcer.register_default_gates()?;
        for (name, gate_override) in &config.gate_overrides {
            if !enforcer.gates.contains_key(name) {
                return Err(ScoringError::Config(format!(
                    "override for unknown gate {name:?}"
                )));
            }
            enforcer.override_gate(name, gate_override)?;
        }
        Ok(enforcer)
    }

    pub fn minimum_score(&self) -> f64 {
        self.minimum_score
    }

    pub fn register_default_gates(&mut self) -> ScoringResult<()> {
        for gate in default_gates()? {
            self.register_gate(gate);
        }
        Ok(())
    }

    /// Insert or replace a gate by name. Replacement keeps the original run
    /// position and hands back the previous definition.
    pub fn register_gate(&mut self, gate: QualityGate) -> Option<QualityGate> {
        let name = gate.name.clone();
        let previous = self.gates.insert(name.clone(), gate);
        if previous.is_some() {
            warn!("Replacing registered quality gate {name}");
        }
        previous
    }

    pub fn gate(&self, name: &str) -> Option<&QualityGate> {
        self.gates.get(name)
    }

    /// Adjust a registered gate in place. Fields left `None` are untouched.
    pub fn override_gate(&mut self, name: &str, gate_override: &GateOverride) -> ScoringResult<()> {
        let gate = self
            .gates
            .get_mut(name)
            .ok_or_else(|| ScoringError::UnknownGate(name.to_string()))?;
        apply_override(gate, gate_override)?;
        debug!("Quality gate {name} overridden: {gate_override:?}");
        Ok(())
    }

    pub fn gate_names(&self) -> Vec<String> {
        self.gates.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn run_gate(
        &self,
        name: &str,
        payload: &Value,
        context: Option<&Value>,
    ) -> ScoringResult<CheckResult> {
        let gate = self
            .gates
            .get(name)
            .ok_or_else(|| ScoringError::UnknownGate(name.to_string()))?;
        Ok(evaluate_gate(gate, payload, context.unwrap_or(&EMPTY_CONTEXT)))
    }

    pub fn run_all_gates(&self, payload: &Value, context: Option<&Value>) -> CompositeQualityReport {
        let context = context.unwrap_or(&EMPTY_CONTEXT);
        let results: Vec<CheckResult> = self
            .gates
            .values()
            .map(|gate| evaluate_gate(gate, payload, context))
            .collect();

        let (weighted, total_weight) = results
            .iter()
            .filter_map(|r| r.score.map(|s| (s * r.weight, r.weight)))
            .fold((0.0, 0.0), |(acc, w), (sw, rw)| (acc + sw, w + rw));
        // The verdict uses the unrounded composite; only the reported figure is rounded.
        let raw_composite = if total_weight > 0.0 {
            weighted / total_weight * MAX_QUALITY_SCORE
        } else {
            0.0
        };

        let required_gates_failed: Vec<String> = results
            .iter()
            .filter(|r| r.required && r.is_failed())
            .map(|r| r.gate.clone())
            .collect();
        let warnings: Vec<String> = results
            .iter()
            .filter(|r| r.status == CheckStatus::Warning)
            .map(|r| r.gate.clone())
            .collect();
        let passed = raw_composite >= self.minimum_score && required_gates_failed.is_empty();

        let report = CompositeQualityReport {
            results,
            composite_score: round_to(raw_composite, 2),
            minimum_score: self.minimum_score,
            required_gates_failed,
            warnings,
            passed,
            evaluated_at: Utc::now(),
        };
        info!(
            "Quality gates evaluated: composite {:.2}, passed={}, required failed={:?}",
            report.composite_score, report.passed, report.required_gates_failed
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Gate evaluation
// ---------------------------------------------------------------------------

fn apply_override(gate: &mut QualityGate, gate_override: &GateOverride) -> ScoringResult<()> {
    if let Some(threshold) = gate_override.threshold {
        validate_threshold(&gate.name, threshold)?;
        gate.threshold = threshold;
    }
    if let Some(weight) = gate_override.weight {
        validate_weight(&gate.name, weight)?;
        gate.weight = weight;
    }
    if let Some(required) = gate_override.required {
        gate.required = required;
    }
    if let Some(enabled) = gate_override.enabled {
        gate.enabled = enabled;
    }
    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn evaluate_gate(gate: &QualityGate, payload: &Value, context: &Value) -> CheckResult {
    let (status, score, message, details) = if !gate.enabled {
        (CheckStatus::Skipped, None, "gate disabled".to_string(), Value::Null)
    } else {
        let outcome = catch_unwind(AssertUnwindSafe(|| gate.check().evaluate(payload, context)));
        match outcome {
            Ok(Ok(outcome)) => match outcome.score {
                None => (CheckStatus::Skipped, None, outcome.message, outcome.details),
                Some(score) if !score.is_finite() => {
                    warn!("Quality check {} returned a non-finite score {score}", gate.name);
                    (
                        CheckStatus::Failed,
                        None,
                        format!("check returned non-finite score {score}"),
                        outcome.details,
                    )
                }
                Some(score) => {
                    let score = score.clamp(0.0, 1.0);
                    let status = if score >= gate.threshold {
                        CheckStatus::Passed
                    } else if gate.required {
                        CheckStatus::Failed
                    } else {
                        CheckStatus::Warning
                    };
                    (status, Some(score), outcome.message, outcome.details)
                }
            },
            Ok(Err(e)) => {
                warn!("Quality check {} failed: {e}", gate.name);
                (CheckStatus::Failed, None, e.to_string(), Value::Null)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!("Quality check {} panicked: {message}", gate.name);
                (
                    CheckStatus::Failed,
                    None,
                    format!("check panicked: {message}"),
                    Value::Null,
                )
            }
        }
    };

    debug!(
        "Quality gate {} evaluated: {} (score {:?})",
        gate.name,
        status.as_str(),
        score
    );
    CheckResult {
        gate: gate.name.clone(),
        status,
        score,
        threshold: gate.threshold,
        weight: gate.weight,
        required: gate.required,
        message,
        details,
        timestamp: Utc::now(),
    }
}
